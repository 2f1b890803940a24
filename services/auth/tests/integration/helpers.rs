use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use otpgate_auth::domain::repository::{
    OtpStore, RefreshTokenRepository, SmsDispatcher, UserRepository,
};
use otpgate_auth::domain::types::{
    Dispatch, OtpChallenge, OtpSettings, RefreshTokenRecord, TokenSettings, User,
};
use otpgate_auth::error::AuthServiceError;
use otpgate_auth::usecase::otp::OtpLifecycle;
use otpgate_auth::usecase::token::SessionIssuer;
use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::phone::PhoneNumber;
use otpgate_domain::user::UserRole;

// ── MockOtpStore ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOtpStore {
    pub challenges: Arc<Mutex<Vec<OtpChallenge>>>,
}

impl MockOtpStore {
    /// Returns a shared handle to the stored challenges for post-execution inspection.
    pub fn challenges_handle(&self) -> Arc<Mutex<Vec<OtpChallenge>>> {
        Arc::clone(&self.challenges)
    }

    pub fn live_count(&self, phone: &str, purpose: OtpPurpose, now: DateTime<Utc>) -> usize {
        self.challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.phone_number == phone && c.purpose == purpose && c.is_live(now))
            .count()
    }
}

impl OtpStore for MockOtpStore {
    async fn delete_unverified(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> Result<u64, AuthServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        let before = challenges.len();
        challenges.retain(|c| !(c.phone_number == phone_number && c.purpose == purpose && !c.verified));
        Ok((before - challenges.len()) as u64)
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError> {
        self.challenges.lock().unwrap().push(challenge.clone());
        Ok(())
    }

    async fn find_live(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.phone_number == phone_number && c.purpose == purpose && c.is_live(now))
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AuthServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        Ok(challenges
            .iter_mut()
            .find(|c| c.id == id && c.is_live(now))
            .map(|c| {
                c.attempts += 1;
                c.updated_at = now;
                c.attempts
            }))
    }

    async fn mark_verified(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AuthServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        match challenges.iter_mut().find(|c| c.id == id && !c.verified) {
            Some(c) => {
                c.verified = true;
                c.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.challenges.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        let before = challenges.len();
        challenges.retain(|c| c.expires_at > now);
        Ok((before - challenges.len()) as u64)
    }
}

// ── YieldingOtpStore ─────────────────────────────────────────────────────────

/// `MockOtpStore` that yields to the scheduler before every call, so
/// concurrent verifies interleave between the lookup and the writes.
#[derive(Clone, Default)]
pub struct YieldingOtpStore {
    pub inner: MockOtpStore,
}

impl OtpStore for YieldingOtpStore {
    async fn delete_unverified(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> Result<u64, AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.delete_unverified(phone_number, purpose).await
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.create(challenge).await
    }

    async fn find_live(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.find_live(phone_number, purpose, now).await
    }

    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.increment_attempts(id, now).await
    }

    async fn mark_verified(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.mark_verified(id, now).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.delete(id).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        tokio::task::yield_now().await;
        self.inner.delete_expired(now).await
    }
}

// ── MockSms ──────────────────────────────────────────────────────────────────

/// Records every message; fails every send when `fail` is set.
#[derive(Clone, Default)]
pub struct MockSms {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl MockSms {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.sent)
    }
}

impl SmsDispatcher for MockSms {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<Dispatch> {
        if self.fail {
            anyhow::bail!("transport unavailable");
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_owned(), body.to_owned()));
        Ok(Dispatch {
            id: format!("SM{:04}", sent.len()),
        })
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.phone_number == user.phone_number) {
            return Err(AuthServiceError::PhoneNumberTaken);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn mark_phone_verified(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.is_phone_verified = true;
            u.updated_at = now;
            u.clone()
        }))
    }

    async fn set_welcome_done(
        &self,
        id: Uuid,
        done: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.is_welcome_done = done;
            u.updated_at = now;
            u.clone()
        }))
    }
}

// ── MockRefreshTokenRepo ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockRefreshTokenRepo {
    pub records: Arc<Mutex<Vec<RefreshTokenRecord>>>,
}

impl MockRefreshTokenRepo {
    pub fn records_handle(&self) -> Arc<Mutex<Vec<RefreshTokenRecord>>> {
        Arc::clone(&self.records)
    }
}

impl RefreshTokenRepository for MockRefreshTokenRepo {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.token == token && !r.blacklisted)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

pub const TEST_PHONE: &str = "+919876543210";

pub fn test_phone() -> PhoneNumber {
    PhoneNumber::parse(TEST_PHONE).unwrap()
}

pub fn test_user(phone: &str, verified: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        name: "Asha".to_owned(),
        phone_number: phone.to_owned(),
        role: UserRole::User,
        is_phone_verified: verified,
        is_welcome_done: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn lifecycle(store: &MockOtpStore, sms: &MockSms) -> OtpLifecycle<MockOtpStore, MockSms> {
    OtpLifecycle {
        store: store.clone(),
        sms: sms.clone(),
        settings: OtpSettings::default(),
    }
}

pub fn session_issuer(repo: &MockRefreshTokenRepo) -> SessionIssuer<MockRefreshTokenRepo> {
    SessionIssuer {
        refresh_tokens: repo.clone(),
        settings: TokenSettings::new(TEST_JWT_SECRET),
    }
}

/// The code of the only stored challenge for the pair.
pub fn stored_code(store: &MockOtpStore, purpose: OtpPurpose) -> String {
    store
        .challenges
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.purpose == purpose && !c.verified)
        .map(|c| c.code.clone())
        .expect("no stored challenge")
}

/// A code of the right length that differs from `code`.
pub fn wrong_code(code: &str) -> String {
    if code == "1111" { "2222" } else { "1111" }.to_owned()
}
