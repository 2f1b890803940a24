pub mod extract;
pub mod phone_auth;
pub mod token;
pub mod user;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use otpgate_core::serde::to_rfc3339_ms;
use otpgate_domain::user::UserRole;

use crate::domain::types::User;
use crate::usecase::token::{IssuedToken, SessionTokens};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub role: UserRole,
    pub is_phone_verified: bool,
    pub is_welcome_done: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone_number: user.phone_number,
            role: user.role,
            is_phone_verified: user.is_phone_verified,
            is_welcome_done: user.is_welcome_done,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires: issued.expires,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub access: TokenResponse,
    pub refresh: TokenResponse,
}

impl From<SessionTokens> for TokensResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access: tokens.access.into(),
            refresh: tokens.refresh.into(),
        }
    }
}
