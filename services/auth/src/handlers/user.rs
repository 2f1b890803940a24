use axum::{Json, extract::State};
use serde::Deserialize;

use otpgate_auth_types::identity::AuthenticatedUser;

use crate::error::AuthServiceError;
use crate::handlers::UserResponse;
use crate::handlers::extract::{Validate, ValidatedJson};
use crate::state::AppState;
use crate::usecase::user::{GetUserUseCase, UpdateWelcomeStatusUseCase};

// ── GET /users/me ─────────────────────────────────────────────────────────────

pub async fn get_me(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthServiceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(caller.user_id).await?;
    Ok(Json(user.into()))
}

// ── PATCH /users/welcome-status ───────────────────────────────────────────────

/// `isWelcomeDone` must be a JSON boolean; serde rejects strings and numbers.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeStatusRequest {
    pub is_welcome_done: bool,
}

impl Validate for WelcomeStatusRequest {
    type Output = bool;

    fn validate(self, _state: &AppState) -> Result<bool, AuthServiceError> {
        Ok(self.is_welcome_done)
    }
}

pub async fn update_welcome_status(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidatedJson(done): ValidatedJson<WelcomeStatusRequest>,
) -> Result<Json<UserResponse>, AuthServiceError> {
    let usecase = UpdateWelcomeStatusUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(caller.user_id, done).await?;
    Ok(Json(user.into()))
}
