use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use otpgate_auth_types::token::{
    JwtClaims, TokenKind, sign_claims, validate_token as validate_jwt,
};

use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::types::{RefreshTokenRecord, TokenSettings, User};
use crate::error::AuthServiceError;

/// A signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Access plus refresh token.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

pub fn issue_token(
    user: &User,
    kind: TokenKind,
    settings: &TokenSettings,
    now: DateTime<Utc>,
) -> Result<IssuedToken, AuthServiceError> {
    let ttl = match kind {
        TokenKind::Access => settings.access_ttl,
        TokenKind::Refresh => settings.refresh_ttl,
    };
    let expires = now + ttl;
    let claims = JwtClaims {
        sub: user.id.to_string(),
        role: user.role.as_u8(),
        typ: kind,
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp().max(0) as u64,
        exp: expires.timestamp().max(0) as u64,
    };
    let token = sign_claims(&claims, &settings.secret)
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok(IssuedToken { token, expires })
}

/// Validate a refresh token (signature, expiry and kind) and return its claims.
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<JwtClaims, AuthServiceError> {
    validate_jwt(token, secret, TokenKind::Refresh).map_err(|_| AuthServiceError::Unauthenticated)
}

// ── SessionIssuer ────────────────────────────────────────────────────────────

/// Mints session pairs and remembers the refresh half.
pub struct SessionIssuer<R: RefreshTokenRepository> {
    pub refresh_tokens: R,
    pub settings: TokenSettings,
}

impl<R: RefreshTokenRepository> SessionIssuer<R> {
    pub async fn issue_pair(&self, user: &User) -> Result<SessionTokens, AuthServiceError> {
        let now = Utc::now();
        let access = issue_token(user, TokenKind::Access, &self.settings, now)?;
        let refresh = issue_token(user, TokenKind::Refresh, &self.settings, now)?;

        self.refresh_tokens
            .create(&RefreshTokenRecord {
                id: Uuid::now_v7(),
                user_id: user.id,
                token: refresh.token.clone(),
                expires_at: refresh.expires,
                blacklisted: false,
                created_at: now,
            })
            .await?;

        Ok(SessionTokens { access, refresh })
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<U: UserRepository, R: RefreshTokenRepository> {
    pub users: U,
    pub sessions: SessionIssuer<R>,
}

impl<U: UserRepository, R: RefreshTokenRepository> RefreshTokenUseCase<U, R> {
    /// Rotate: the presented refresh token is deleted and a new pair issued.
    /// Every failure is reported as `Unauthenticated`.
    pub async fn execute(&self, refresh_token: &str) -> Result<SessionTokens, AuthServiceError> {
        let claims = validate_refresh_token(refresh_token, &self.sessions.settings.secret)?;

        let stored = self
            .sessions
            .refresh_tokens
            .find_active(refresh_token)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::Unauthenticated)?;
        if stored.user_id != user_id {
            return Err(AuthServiceError::Unauthenticated);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)?;

        self.sessions.refresh_tokens.delete(stored.id).await?;
        let tokens = self.sessions.issue_pair(&user).await?;
        info!(user_id = %user.id, "session refreshed");
        Ok(tokens)
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<R: RefreshTokenRepository> {
    pub refresh_tokens: R,
}

impl<R: RefreshTokenRepository> LogoutUseCase<R> {
    pub async fn execute(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        let stored = self
            .refresh_tokens
            .find_active(refresh_token)
            .await?
            .ok_or(AuthServiceError::TokenNotFound)?;
        self.refresh_tokens.delete(stored.id).await?;
        info!(user_id = %stored.user_id, "session revoked");
        Ok(())
    }
}
