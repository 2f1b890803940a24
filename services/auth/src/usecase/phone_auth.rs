use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::phone::PhoneNumber;
use otpgate_domain::user::UserRole;

use crate::domain::repository::{OtpStore, RefreshTokenRepository, SmsDispatcher, UserRepository};
use crate::domain::types::{User, VerifyFailure, VerifyOutcome};
use crate::error::AuthServiceError;
use crate::usecase::otp::OtpLifecycle;
use crate::usecase::token::{SessionIssuer, SessionTokens};

impl From<VerifyFailure> for AuthServiceError {
    fn from(reason: VerifyFailure) -> Self {
        match reason {
            VerifyFailure::NotFoundOrExpired => Self::OtpNotFoundOrExpired,
            VerifyFailure::CodeMismatch => Self::OtpCodeMismatch,
            VerifyFailure::AttemptsExceeded => Self::OtpAttemptsExceeded,
        }
    }
}

/// Acknowledgement returned once an OTP was handed to the SMS transport.
#[derive(Debug, Clone)]
pub struct OtpSentOutput {
    pub phone_number: PhoneNumber,
    pub dispatch_id: String,
}

// ── SendOtp ──────────────────────────────────────────────────────────────────

pub struct SendOtpInput {
    pub phone: PhoneNumber,
    pub purpose: OtpPurpose,
}

pub struct SendOtpUseCase<S: OtpStore, D: SmsDispatcher> {
    pub otps: OtpLifecycle<S, D>,
}

impl<S: OtpStore, D: SmsDispatcher> SendOtpUseCase<S, D> {
    pub async fn execute(&self, input: SendOtpInput) -> Result<OtpSentOutput, AuthServiceError> {
        let issued = self.otps.issue(&input.phone, input.purpose).await?;
        Ok(OtpSentOutput {
            phone_number: input.phone,
            dispatch_id: issued.dispatch.id,
        })
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub phone: PhoneNumber,
    pub code: String,
    pub purpose: OtpPurpose,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    /// Present when a user exists for the phone after verification.
    pub user: Option<User>,
    /// Issued whenever `user` is present.
    pub tokens: Option<SessionTokens>,
}

pub struct VerifyOtpUseCase<S, D, U, R>
where
    S: OtpStore,
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub otps: OtpLifecycle<S, D>,
    pub users: U,
    pub sessions: SessionIssuer<R>,
}

impl<S, D, U, R> VerifyOtpUseCase<S, D, U, R>
where
    S: OtpStore,
    U: UserRepository,
    R: RefreshTokenRepository,
{
    /// The OTP verification, the user update and the session issue are separate
    /// writes; a failure after the first leaves the challenge verified.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, AuthServiceError> {
        if let VerifyOutcome::Rejected(reason) = self
            .otps
            .verify(&input.phone, &input.code, input.purpose)
            .await?
        {
            return Err(reason.into());
        }

        let mut user = self.users.find_by_phone(input.phone.as_str()).await?;
        if input.purpose == OtpPurpose::PhoneVerification {
            user = Some(self.confirm_phone(&input.phone, user).await?);
        }

        let tokens = match &user {
            Some(user) => Some(self.sessions.issue_pair(user).await?),
            None => None,
        };

        Ok(VerifyOtpOutput { user, tokens })
    }

    /// Create a verified user, or flip the flag on an existing one.
    async fn confirm_phone(
        &self,
        phone: &PhoneNumber,
        existing: Option<User>,
    ) -> Result<User, AuthServiceError> {
        let now = Utc::now();
        match existing {
            Some(user) if user.is_phone_verified => Ok(user),
            Some(user) => self
                .users
                .mark_phone_verified(user.id, now)
                .await?
                .ok_or(AuthServiceError::UserNotFound),
            None => {
                let user = User {
                    id: Uuid::now_v7(),
                    name: format!("User_{}", phone.last_four()),
                    phone_number: phone.as_str().to_owned(),
                    role: UserRole::User,
                    is_phone_verified: true,
                    is_welcome_done: false,
                    created_at: now,
                    updated_at: now,
                };
                self.users.create(&user).await?;
                info!(user_id = %user.id, "user registered by phone");
                Ok(user)
            }
        }
    }
}

// ── PhoneLogin ───────────────────────────────────────────────────────────────

pub struct PhoneLoginUseCase<U: UserRepository, S: OtpStore, D: SmsDispatcher> {
    pub users: U,
    pub otps: OtpLifecycle<S, D>,
}

impl<U: UserRepository, S: OtpStore, D: SmsDispatcher> PhoneLoginUseCase<U, S, D> {
    /// Send a login OTP to a known, verified phone. The session itself is issued
    /// by the following verify call.
    pub async fn execute(&self, phone: PhoneNumber) -> Result<OtpSentOutput, AuthServiceError> {
        let user = self
            .users
            .find_by_phone(phone.as_str())
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !user.is_phone_verified {
            return Err(AuthServiceError::PhoneNotVerified);
        }

        let issued = self
            .otps
            .issue(&phone, OtpPurpose::Login)
            .await
            .map_err(|e| match e {
                AuthServiceError::DeliveryFailed(source) => {
                    AuthServiceError::LoginDeliveryFailed(source)
                }
                other => other,
            })?;
        Ok(OtpSentOutput {
            phone_number: phone,
            dispatch_id: issued.dispatch.id,
        })
    }
}
