use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid or expired OTP")]
    OtpNotFoundOrExpired,
    #[error("Invalid OTP")]
    OtpCodeMismatch,
    #[error("Maximum attempts exceeded. Please request a new OTP.")]
    OtpAttemptsExceeded,
    #[error("Failed to send OTP")]
    DeliveryFailed(#[source] anyhow::Error),
    #[error("Failed to send login OTP")]
    LoginDeliveryFailed(#[source] anyhow::Error),
    #[error("No account found with this phone number")]
    UserNotFound,
    #[error("Phone number not verified. Please verify your phone number first.")]
    PhoneNotVerified,
    #[error("Not found")]
    TokenNotFound,
    #[error("Please authenticate")]
    Unauthenticated,
    #[error("Phone number already taken")]
    PhoneNumberTaken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::OtpNotFoundOrExpired => "OTP_NOT_FOUND_OR_EXPIRED",
            Self::OtpCodeMismatch => "OTP_CODE_MISMATCH",
            Self::OtpAttemptsExceeded => "OTP_ATTEMPTS_EXCEEDED",
            Self::DeliveryFailed(_) | Self::LoginDeliveryFailed(_) => "DELIVERY_FAILED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PhoneNotVerified => "PHONE_NOT_VERIFIED",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PhoneNumberTaken => "PHONE_NUMBER_TAKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::OtpNotFoundOrExpired
            | Self::OtpCodeMismatch
            | Self::OtpAttemptsExceeded
            | Self::PhoneNotVerified => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::TokenNotFound => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PhoneNumberTaken => StatusCode::CONFLICT,
            Self::DeliveryFailed(_) | Self::LoginDeliveryFailed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AuthServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Log 5xx only. tower-http TraceLayer already records method/uri/status for all
        // requests; the anyhow chain is what makes the root cause traceable.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "internal error");
            }
            Self::DeliveryFailed(e) | Self::LoginDeliveryFailed(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "sms delivery failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
