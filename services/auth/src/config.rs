use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use otpgate_core::config::Config;

use crate::domain::types::{
    DEFAULT_ACCESS_TOKEN_MINUTES, DEFAULT_OTP_DIGITS, DEFAULT_OTP_MAX_ATTEMPTS,
    DEFAULT_OTP_TTL_MINUTES, DEFAULT_REFRESH_TOKEN_DAYS, OtpSettings, TokenSettings,
};
use crate::infra::sms::TwilioOptions;

fn default_auth_port() -> u16 {
    3112
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_owned()
}

fn default_sms_timeout_secs() -> u64 {
    10
}

fn default_otp_digits() -> u32 {
    DEFAULT_OTP_DIGITS
}

fn default_otp_ttl_minutes() -> i64 {
    DEFAULT_OTP_TTL_MINUTES
}

fn default_otp_max_attempts() -> i32 {
    DEFAULT_OTP_MAX_ATTEMPTS
}

fn default_otp_sweep_interval_secs() -> u64 {
    60
}

fn default_access_minutes() -> i64 {
    DEFAULT_ACCESS_TOKEN_MINUTES
}

fn default_refresh_days() -> i64 {
    DEFAULT_REFRESH_TOKEN_DAYS
}

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    /// Sender number for OTP messages.
    pub twilio_phone_number: String,
    #[serde(default = "default_twilio_api_base")]
    pub twilio_api_base: String,
    #[serde(default = "default_sms_timeout_secs")]
    pub sms_timeout_secs: u64,

    #[serde(default = "default_otp_digits")]
    pub otp_digits: u32,
    #[serde(default = "default_otp_ttl_minutes")]
    pub otp_ttl_minutes: i64,
    #[serde(default = "default_otp_max_attempts")]
    pub otp_max_attempts: i32,
    #[serde(default = "default_otp_sweep_interval_secs")]
    pub otp_sweep_interval_secs: u64,

    #[serde(default = "default_access_minutes")]
    pub jwt_access_expiration_minutes: i64,
    #[serde(default = "default_refresh_days")]
    pub jwt_refresh_expiration_days: i64,
}

impl Config for AuthConfig {}

impl AuthConfig {
    pub fn otp_settings(&self) -> anyhow::Result<OtpSettings> {
        OtpSettings::new(self.otp_digits, self.otp_ttl_minutes, self.otp_max_attempts)
    }

    pub fn token_settings(&self) -> anyhow::Result<TokenSettings> {
        anyhow::ensure!(!self.jwt_secret.is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(
            self.jwt_access_expiration_minutes > 0,
            "JWT_ACCESS_EXPIRATION_MINUTES must be positive"
        );
        anyhow::ensure!(
            self.jwt_refresh_expiration_days > 0,
            "JWT_REFRESH_EXPIRATION_DAYS must be positive"
        );
        let access_ttl = chrono::Duration::try_minutes(self.jwt_access_expiration_minutes)
            .context("JWT_ACCESS_EXPIRATION_MINUTES is out of range")?;
        let refresh_ttl = chrono::Duration::try_days(self.jwt_refresh_expiration_days)
            .context("JWT_REFRESH_EXPIRATION_DAYS is out of range")?;
        Ok(TokenSettings {
            secret: self.jwt_secret.as_str().into(),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn twilio_options(&self) -> TwilioOptions {
        TwilioOptions {
            base_url: self.twilio_api_base.clone(),
            account_sid: self.twilio_account_sid.clone(),
            auth_token: self.twilio_auth_token.clone(),
            from: self.twilio_phone_number.clone(),
            timeout: Duration::from_secs(self.sms_timeout_secs),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.otp_sweep_interval_secs.max(1))
    }
}
