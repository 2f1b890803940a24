use chrono::{DateTime, Utc};
use rand::RngExt;
use tracing::{debug, info};
use uuid::Uuid;

use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::phone::PhoneNumber;

use crate::domain::repository::{OtpStore, SmsDispatcher};
use crate::domain::types::{
    Dispatch, OTP_DIGITS_RANGE, OtpChallenge, OtpSettings, VerifyFailure, VerifyOutcome,
};
use crate::error::AuthServiceError;

/// Random numeric code of exactly `digits` digits with a non-zero leading digit.
/// `digits` is clamped to [`OTP_DIGITS_RANGE`].
pub fn generate_code(digits: u32) -> String {
    let digits = digits.clamp(*OTP_DIGITS_RANGE.start(), *OTP_DIGITS_RANGE.end());
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits);
    rand::rng().random_range(low..high).to_string()
}

pub fn otp_message(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Your verification code is: {code}. This code will expire in {ttl_minutes} minutes. Do not share this code with anyone."
    )
}

/// A persisted challenge plus the transport receipt for its SMS.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub challenge: OtpChallenge,
    pub dispatch: Dispatch,
}

/// Creates, verifies and expires OTP challenges.
///
/// ```text
/// Created(attempts=0) ──verify──▶ attempts+1 ──match──▶ Verified
///                                      │
///                                      └──attempts > cap──▶ deleted
/// ```
///
/// A newer `issue` for the same (phone, purpose) deletes the older unverified
/// challenge. Issue and verify are separate store calls with no transaction, so
/// two concurrent issues for one pair may both survive.
pub struct OtpLifecycle<S, D> {
    pub store: S,
    pub sms: D,
    pub settings: OtpSettings,
}

impl<S, D> OtpLifecycle<S, D>
where
    S: OtpStore,
    D: SmsDispatcher,
{
    pub async fn issue(
        &self,
        phone: &PhoneNumber,
        purpose: OtpPurpose,
    ) -> Result<IssuedOtp, AuthServiceError> {
        self.issue_at(Utc::now(), phone, purpose).await
    }

    /// Persist a fresh challenge, then hand the code to the SMS transport.
    ///
    /// The challenge is stored before dispatch, so on `DeliveryFailed` it is
    /// still verifiable.
    pub async fn issue_at(
        &self,
        now: DateTime<Utc>,
        phone: &PhoneNumber,
        purpose: OtpPurpose,
    ) -> Result<IssuedOtp, AuthServiceError> {
        let superseded = self
            .store
            .delete_unverified(phone.as_str(), purpose)
            .await?;

        let challenge = OtpChallenge {
            id: Uuid::now_v7(),
            phone_number: phone.as_str().to_owned(),
            code: generate_code(self.settings.digits),
            purpose,
            attempts: 0,
            verified: false,
            expires_at: now + self.settings.ttl(),
            created_at: now,
            updated_at: now,
        };
        self.store.create(&challenge).await?;
        debug!(
            challenge_id = %challenge.id,
            %purpose,
            superseded,
            "otp challenge created"
        );

        let body = otp_message(&challenge.code, self.settings.ttl_minutes);
        let dispatch = self
            .sms
            .send(phone.as_str(), &body)
            .await
            .map_err(AuthServiceError::DeliveryFailed)?;
        info!(
            challenge_id = %challenge.id,
            dispatch_id = %dispatch.id,
            %purpose,
            "otp dispatched"
        );

        Ok(IssuedOtp {
            challenge,
            dispatch,
        })
    }
}

impl<S, D> OtpLifecycle<S, D>
where
    S: OtpStore,
{
    pub async fn verify(
        &self,
        phone: &PhoneNumber,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<VerifyOutcome, AuthServiceError> {
        self.verify_at(Utc::now(), phone, code, purpose).await
    }

    /// Attempts are counted before the code is compared: once the cap is
    /// passed the call fails even with the right code.
    pub async fn verify_at(
        &self,
        now: DateTime<Utc>,
        phone: &PhoneNumber,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<VerifyOutcome, AuthServiceError> {
        let Some(mut challenge) = self
            .store
            .find_live(phone.as_str(), purpose, now)
            .await?
        else {
            return Ok(VerifyOutcome::Rejected(VerifyFailure::NotFoundOrExpired));
        };

        // The store does the increment so concurrent calls each see their own count.
        let Some(attempts) = self.store.increment_attempts(challenge.id, now).await? else {
            return Ok(VerifyOutcome::Rejected(VerifyFailure::NotFoundOrExpired));
        };
        challenge.attempts = attempts;
        challenge.updated_at = now;

        if challenge.attempts > self.settings.max_attempts {
            self.store.delete(challenge.id).await?;
            info!(challenge_id = %challenge.id, %purpose, "otp attempts exceeded");
            return Ok(VerifyOutcome::Rejected(VerifyFailure::AttemptsExceeded));
        }

        if challenge.code != code {
            debug!(
                challenge_id = %challenge.id,
                attempts = challenge.attempts,
                "otp code mismatch"
            );
            return Ok(VerifyOutcome::Rejected(VerifyFailure::CodeMismatch));
        }

        if !self.store.mark_verified(challenge.id, now).await? {
            debug!(challenge_id = %challenge.id, "otp already verified by another call");
            return Ok(VerifyOutcome::Rejected(VerifyFailure::NotFoundOrExpired));
        }
        challenge.verified = true;
        Ok(VerifyOutcome::Verified(challenge))
    }
}

/// Delete challenges whose `expires_at` has passed.
pub async fn purge_expired<S: OtpStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<u64, AuthServiceError> {
    store.delete_expired(now).await
}
