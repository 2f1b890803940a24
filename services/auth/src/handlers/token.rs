use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::handlers::TokensResponse;
use crate::handlers::extract::{Validate, ValidatedJson};
use crate::state::AppState;
use crate::usecase::token::{LogoutUseCase, RefreshTokenUseCase};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl Validate for RefreshTokenRequest {
    type Output = String;

    fn validate(self, _state: &AppState) -> Result<String, AuthServiceError> {
        if self.refresh_token.is_empty() {
            return Err(AuthServiceError::Validation(
                "refreshToken must not be empty".to_owned(),
            ));
        }
        Ok(self.refresh_token)
    }
}

// ── POST /auth/logout ─────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(refresh_token): ValidatedJson<RefreshTokenRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = LogoutUseCase {
        refresh_tokens: state.refresh_token_repo(),
    };
    usecase.execute(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/refresh-tokens ─────────────────────────────────────────────────

pub async fn refresh_tokens(
    State(state): State<AppState>,
    ValidatedJson(refresh_token): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokensResponse>, AuthServiceError> {
    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        sessions: state.session_issuer(),
    };
    let tokens = usecase.execute(&refresh_token).await?;
    Ok(Json(tokens.into()))
}
