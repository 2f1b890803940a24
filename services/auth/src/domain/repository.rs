#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use otpgate_domain::otp::OtpPurpose;

use crate::domain::types::{Dispatch, OtpChallenge, RefreshTokenRecord, User};
use crate::error::AuthServiceError;

/// Persistent store of OTP challenges.
pub trait OtpStore: Send + Sync {
    /// Delete every unverified challenge for the pair. Returns the number removed.
    async fn delete_unverified(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> Result<u64, AuthServiceError>;

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError>;

    /// Find the unverified challenge for the pair with `expires_at > now`.
    async fn find_live(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError>;

    /// Add one attempt to a live challenge in a single write and return the new
    /// count. `None` if the challenge is gone, verified or expired.
    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AuthServiceError>;

    /// Set `verified = true` only if it is still false. Returns whether this
    /// call made the change.
    async fn mark_verified(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AuthServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError>;

    /// Delete every challenge with `expires_at <= now`. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Outbound SMS transport.
pub trait SmsDispatcher: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<Dispatch>;
}

/// User directory keyed by phone number.
pub trait UserRepository: Send + Sync {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Insert a user. Fails with `PhoneNumberTaken` if the phone number exists.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Set `is_phone_verified = true`. Returns the updated user, `None` if absent.
    async fn mark_phone_verified(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthServiceError>;

    /// Returns the updated user, `None` if absent.
    async fn set_welcome_done(
        &self,
        id: Uuid,
        done: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthServiceError>;
}

/// Repository for issued refresh tokens.
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError>;

    /// Find a stored, non-blacklisted token by its value.
    async fn find_active(&self, token: &str)
    -> Result<Option<RefreshTokenRecord>, AuthServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError>;
}
