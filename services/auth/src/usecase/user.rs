use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::AuthServiceError;

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    /// A valid token for a user that no longer exists is treated as unauthenticated.
    pub async fn execute(&self, user_id: Uuid) -> Result<User, AuthServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)
    }
}

// ── UpdateWelcomeStatus ──────────────────────────────────────────────────────

pub struct UpdateWelcomeStatusUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateWelcomeStatusUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, done: bool) -> Result<User, AuthServiceError> {
        self.users
            .set_welcome_done(user_id, done, Utc::now())
            .await?
            .ok_or(AuthServiceError::Unauthenticated)
    }
}
