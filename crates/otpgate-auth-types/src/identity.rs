//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::token::validate_access_token;

/// HMAC secret used to validate access tokens. Provide it from the router state
/// with `FromRef`.
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Caller identity taken from a valid `Authorization: Bearer <access token>` header.
///
/// Rejects with 401 when the header is absent, malformed, expired or signed
/// with another key. Role enforcement is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub user_role: u8,
    pub access_token_exp: u64,
}

/// Rejection for [`AuthenticatedUser`].
#[derive(Debug)]
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHENTICATED",
            "message": "Please authenticate",
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    // Work is done synchronously so the returned future borrows nothing from
    // `parts` or `state`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let JwtSecret(secret) = JwtSecret::from_ref(state);
        let result = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(Unauthenticated)
            .and_then(|Authorization(bearer)| {
                validate_access_token(bearer.token(), &secret).map_err(|e| {
                    tracing::debug!(error = %e, "rejected access token");
                    Unauthenticated
                })
            })
            .map(|info| Self {
                user_id: info.user_id,
                user_role: info.user_role,
                access_token_exp: info.access_token_exp,
            });

        async move { result }
    }
}
