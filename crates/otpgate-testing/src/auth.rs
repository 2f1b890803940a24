//! Mock auth helpers for integration tests.
//!
//! Endpoints behind `AuthenticatedUser` expect an `Authorization: Bearer` access
//! token. `MockAuth` signs one directly with the test secret so no login flow is
//! needed.

use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use otpgate_auth_types::token::{JwtClaims, TokenKind, sign_claims};

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub user_role: u8,
}

impl MockAuth {
    pub fn new(user_id: Uuid, user_role: u8) -> Self {
        Self { user_id, user_role }
    }

    /// Sign an access token valid for ten minutes.
    pub fn access_token(&self, secret: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = JwtClaims {
            sub: self.user_id.to_string(),
            role: self.user_role,
            typ: TokenKind::Access,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 600,
        };
        sign_claims(&claims, secret).unwrap()
    }

    /// `Authorization` header value for [`Self::access_token`].
    pub fn bearer(&self, secret: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.access_token(secret))).unwrap()
    }

    /// Return headers carrying the bearer token.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.bearer(secret));
        map
    }
}
