//! Indian mobile number validation.

use std::fmt;

use serde::Serialize;

/// A phone number that passed format validation.
///
/// Accepted formats: `+91XXXXXXXXXX`, `91XXXXXXXXXX` and `XXXXXXXXXX`, where the
/// ten-digit subscriber number starts with 6-9. The value is kept exactly as
/// submitted; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "phone must be a valid Indian phone number (10 digits starting with 6-9, optionally prefixed with +91 or 91)"
)]
pub struct InvalidPhoneNumber;

impl PhoneNumber {
    pub fn parse(value: &str) -> Result<Self, InvalidPhoneNumber> {
        if is_indian_mobile(value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(InvalidPhoneNumber)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits, used for default display names.
    pub fn last_four(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_indian_mobile(value: &str) -> bool {
    // "91" followed by ten digits is twelve digits; a bare ten-digit number never
    // carries the prefix.
    let subscriber = value
        .strip_prefix("+91")
        .or_else(|| (value.len() == 12).then(|| value.strip_prefix("91")).flatten())
        .unwrap_or(value);

    let bytes = subscriber.as_bytes();
    bytes.len() == 10
        && matches!(bytes[0], b'6'..=b'9')
        && bytes.iter().all(u8::is_ascii_digit)
}
