use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::phone::PhoneNumber;

use crate::error::AuthServiceError;
use crate::handlers::extract::{Validate, ValidatedJson, check_otp, parse_phone, parse_purpose};
use crate::handlers::{TokensResponse, UserResponse};
use crate::state::AppState;
use crate::usecase::phone_auth::{
    OtpSentOutput, PhoneLoginUseCase, SendOtpInput, SendOtpUseCase, VerifyOtpInput,
    VerifyOtpUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSentResponse {
    pub message: &'static str,
    pub phone_number: String,
    pub dispatch_id: String,
}

impl OtpSentResponse {
    fn new(message: &'static str, out: OtpSentOutput) -> Self {
        Self {
            message,
            phone_number: out.phone_number.into_inner(),
            dispatch_id: out.dispatch_id,
        }
    }
}

#[derive(Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

impl Validate for PhoneRequest {
    type Output = PhoneNumber;

    fn validate(self, _state: &AppState) -> Result<PhoneNumber, AuthServiceError> {
        parse_phone(&self.phone)
    }
}

// ── POST /auth/send-mobile-otp ────────────────────────────────────────────────

pub async fn send_mobile_otp(
    State(state): State<AppState>,
    ValidatedJson(phone): ValidatedJson<PhoneRequest>,
) -> Result<Json<OtpSentResponse>, AuthServiceError> {
    let usecase = SendOtpUseCase {
        otps: state.otp_lifecycle(),
    };
    let out = usecase
        .execute(SendOtpInput {
            phone,
            purpose: OtpPurpose::PhoneVerification,
        })
        .await?;
    Ok(Json(OtpSentResponse::new("OTP sent successfully", out)))
}

// ── POST /auth/verify-mobile-otp ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: String,
    pub purpose: Option<String>,
}

impl Validate for VerifyOtpRequest {
    type Output = VerifyOtpInput;

    fn validate(self, state: &AppState) -> Result<VerifyOtpInput, AuthServiceError> {
        let phone = parse_phone(&self.phone)?;
        check_otp(&self.otp, &state.otp)?;
        let purpose = parse_purpose(self.purpose.as_deref())?;
        Ok(VerifyOtpInput {
            phone,
            code: self.otp,
            purpose,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub message: &'static str,
    pub phone_number: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokensResponse>,
}

/// OTP rejections keep the error shape and add the phone number.
fn otp_rejected(phone: &PhoneNumber, error: &AuthServiceError) -> Response {
    let body = serde_json::json!({
        "kind": error.kind(),
        "message": error.to_string(),
        "phoneNumber": phone.as_str(),
        "verified": false,
    });
    (error.status(), Json(body)).into_response()
}

pub async fn verify_mobile_otp(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<VerifyOtpRequest>,
) -> Result<Response, AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        otps: state.otp_lifecycle(),
        users: state.user_repo(),
        sessions: state.session_issuer(),
    };

    let phone = input.phone.clone();
    match usecase.execute(input).await {
        Ok(out) => {
            let body = VerifyOtpResponse {
                message: "OTP verified successfully",
                phone_number: phone.into_inner(),
                verified: true,
                user: out.user.map(UserResponse::from),
                tokens: out.tokens.map(TokensResponse::from),
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(
            e @ (AuthServiceError::OtpNotFoundOrExpired
            | AuthServiceError::OtpCodeMismatch
            | AuthServiceError::OtpAttemptsExceeded),
        ) => Ok(otp_rejected(&phone, &e)),
        Err(e) => Err(e),
    }
}

// ── POST /auth/phone-login ────────────────────────────────────────────────────

pub async fn phone_login(
    State(state): State<AppState>,
    ValidatedJson(phone): ValidatedJson<PhoneRequest>,
) -> Result<Json<OtpSentResponse>, AuthServiceError> {
    let usecase = PhoneLoginUseCase {
        users: state.user_repo(),
        otps: state.otp_lifecycle(),
    };
    let out = usecase.execute(phone).await?;
    Ok(Json(OtpSentResponse::new("Login OTP sent successfully", out)))
}
