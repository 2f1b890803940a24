use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::user::UserRole;

/// User record as seen by the auth flows.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub role: UserRole,
    pub is_phone_verified: bool,
    pub is_welcome_done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One OTP sent to a phone number for a purpose.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub phone_number: String,
    pub code: String,
    pub purpose: OtpPurpose,
    pub attempts: i32,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Unverified and strictly before `expires_at`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.verified && now < self.expires_at
    }
}

/// Why a verification attempt did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    /// No live challenge for the (phone, purpose) pair.
    NotFoundOrExpired,
    /// The submitted code differs; the challenge stays live.
    CodeMismatch,
    /// The attempt cap was passed; the challenge was deleted.
    AttemptsExceeded,
}

/// Result of [`crate::usecase::otp::OtpLifecycle::verify`].
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Verified(OtpChallenge),
    Rejected(VerifyFailure),
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    pub fn failure(&self) -> Option<VerifyFailure> {
        match self {
            Self::Verified(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// Receipt from the SMS transport. Acceptance only, not delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub id: String,
}

/// Stored refresh token.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
}

/// OTP code length in digits.
pub const DEFAULT_OTP_DIGITS: u32 = 4;

/// OTP time-to-live in minutes.
pub const DEFAULT_OTP_TTL_MINUTES: i64 = 10;

/// Longest accepted OTP lifetime, one day.
pub const MAX_OTP_TTL_MINUTES: i64 = 24 * 60;

/// Verify calls allowed per challenge; the next one deletes it.
pub const DEFAULT_OTP_MAX_ATTEMPTS: i32 = 3;

/// Supported OTP lengths. Nine digits is the most a `u32` range can hold.
pub const OTP_DIGITS_RANGE: std::ops::RangeInclusive<u32> = 4..=9;

/// OTP issuance and verification parameters.
#[derive(Debug, Clone, Copy)]
pub struct OtpSettings {
    pub digits: u32,
    pub ttl_minutes: i64,
    pub max_attempts: i32,
}

impl OtpSettings {
    pub fn new(digits: u32, ttl_minutes: i64, max_attempts: i32) -> anyhow::Result<Self> {
        anyhow::ensure!(
            OTP_DIGITS_RANGE.contains(&digits),
            "OTP_DIGITS must be between {} and {}, got {digits}",
            OTP_DIGITS_RANGE.start(),
            OTP_DIGITS_RANGE.end()
        );
        anyhow::ensure!(
            (1..=MAX_OTP_TTL_MINUTES).contains(&ttl_minutes),
            "OTP_TTL_MINUTES must be between 1 and {MAX_OTP_TTL_MINUTES}, got {ttl_minutes}"
        );
        anyhow::ensure!(max_attempts > 0, "OTP_MAX_ATTEMPTS must be positive");
        Ok(Self {
            digits,
            ttl_minutes,
            max_attempts,
        })
    }

    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_minutes.clamp(1, MAX_OTP_TTL_MINUTES))
    }
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            digits: DEFAULT_OTP_DIGITS,
            ttl_minutes: DEFAULT_OTP_TTL_MINUTES,
            max_attempts: DEFAULT_OTP_MAX_ATTEMPTS,
        }
    }
}

/// Access-token lifetime in minutes.
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 30;

/// Refresh-token lifetime in days.
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 30;

/// JWT signing parameters.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: Arc<str>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_MINUTES),
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TOKEN_DAYS),
        }
    }
}
