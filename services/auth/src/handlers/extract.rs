use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::phone::PhoneNumber;

use crate::domain::types::OtpSettings;
use crate::error::AuthServiceError;
use crate::state::AppState;

/// Checks a deserialized request body and turns it into usecase input.
pub trait Validate {
    type Output;

    fn validate(self, state: &AppState) -> Result<Self::Output, AuthServiceError>;
}

/// JSON body extractor that runs [`Validate`] before the handler sees it.
/// Both malformed JSON and failed checks reject with 400 `VALIDATION`.
pub struct ValidatedJson<T: Validate>(pub T::Output);

impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: Validate + DeserializeOwned + Send,
    T::Output: Send,
{
    type Rejection = AuthServiceError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await?;
        Ok(Self(body.validate(state)?))
    }
}

pub fn parse_phone(phone: &str) -> Result<PhoneNumber, AuthServiceError> {
    PhoneNumber::parse(phone).map_err(|e| AuthServiceError::Validation(e.to_string()))
}

pub fn check_otp(otp: &str, settings: &OtpSettings) -> Result<(), AuthServiceError> {
    let digits = settings.digits as usize;
    if otp.len() != digits || !otp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthServiceError::Validation(format!(
            "otp must be a {digits}-digit number"
        )));
    }
    Ok(())
}

pub fn parse_purpose(purpose: Option<&str>) -> Result<OtpPurpose, AuthServiceError> {
    let Some(purpose) = purpose else {
        return Ok(OtpPurpose::default());
    };
    purpose
        .parse::<OtpPurpose>()
        .map_err(|e| AuthServiceError::Validation(e.to_string()))
}
