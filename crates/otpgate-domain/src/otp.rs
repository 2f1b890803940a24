//! OTP purpose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why an OTP was issued. Scopes the single-live-challenge invariant and decides
/// what happens after a successful verification.
///
/// Wire and storage format: snake_case string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    #[default]
    PhoneVerification,
    Login,
    PasswordReset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("purpose must be one of [phone_verification, login, password_reset]")]
pub struct UnknownPurpose;

impl OtpPurpose {
    pub const ALL: [OtpPurpose; 3] = [Self::PhoneVerification, Self::Login, Self::PasswordReset];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhoneVerification => "phone_verification",
            Self::Login => "login",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(UnknownPurpose)
    }
}
