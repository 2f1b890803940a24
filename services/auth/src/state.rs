use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use otpgate_auth_types::identity::JwtSecret;

use crate::domain::types::{OtpSettings, TokenSettings};
use crate::infra::db::{DbOtpStore, DbRefreshTokenRepository, DbUserRepository};
use crate::infra::sms::TwilioSmsDispatcher;
use crate::usecase::otp::OtpLifecycle;
use crate::usecase::token::SessionIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sms: TwilioSmsDispatcher,
    pub otp: OtpSettings,
    pub tokens: TokenSettings,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_store(&self) -> DbOtpStore {
        DbOtpStore {
            db: self.db.clone(),
        }
    }

    pub fn refresh_token_repo(&self) -> DbRefreshTokenRepository {
        DbRefreshTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_lifecycle(&self) -> OtpLifecycle<DbOtpStore, TwilioSmsDispatcher> {
        OtpLifecycle {
            store: self.otp_store(),
            sms: self.sms.clone(),
            settings: self.otp,
        }
    }

    pub fn session_issuer(&self) -> SessionIssuer<DbRefreshTokenRepository> {
        SessionIssuer {
            refresh_tokens: self.refresh_token_repo(),
            settings: self.tokens.clone(),
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        JwtSecret(state.tokens.secret.clone())
    }
}
