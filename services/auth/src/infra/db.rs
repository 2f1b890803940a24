use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr, sea_query::Expr,
};
use uuid::Uuid;

use otpgate_auth_schema::{otp_challenges, refresh_tokens, users};
use otpgate_domain::otp::OtpPurpose;
use otpgate_domain::user::UserRole;

use crate::domain::repository::{OtpStore, RefreshTokenRepository, UserRepository};
use crate::domain::types::{OtpChallenge, RefreshTokenRecord, User};
use crate::error::AuthServiceError;

// ── OTP store ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpStore {
    pub db: DatabaseConnection,
}

impl OtpStore for DbOtpStore {
    async fn delete_unverified(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> Result<u64, AuthServiceError> {
        let result = otp_challenges::Entity::delete_many()
            .filter(otp_challenges::Column::PhoneNumber.eq(phone_number))
            .filter(otp_challenges::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_challenges::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .context("delete unverified otp challenges")?;
        Ok(result.rows_affected)
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError> {
        otp_challenges::ActiveModel {
            id: Set(challenge.id),
            phone_number: Set(challenge.phone_number.clone()),
            code: Set(challenge.code.clone()),
            purpose: Set(challenge.purpose.as_str().to_owned()),
            attempts: Set(challenge.attempts),
            verified: Set(challenge.verified),
            expires_at: Set(challenge.expires_at),
            created_at: Set(challenge.created_at),
            updated_at: Set(challenge.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create otp challenge")?;
        Ok(())
    }

    async fn find_live(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::PhoneNumber.eq(phone_number))
            .filter(otp_challenges::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_challenges::Column::Verified.eq(false))
            .filter(otp_challenges::Column::ExpiresAt.gt(now))
            .order_by_desc(otp_challenges::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find live otp challenge")?;
        model.map(challenge_from_model).transpose()
    }

    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AuthServiceError> {
        // UPDATE ... SET attempts = attempts + 1 ... RETURNING *
        let updated = otp_challenges::Entity::update_many()
            .col_expr(
                otp_challenges::Column::Attempts,
                Expr::col(otp_challenges::Column::Attempts).add(1),
            )
            .col_expr(otp_challenges::Column::UpdatedAt, Expr::value(now))
            .filter(otp_challenges::Column::Id.eq(id))
            .filter(otp_challenges::Column::Verified.eq(false))
            .filter(otp_challenges::Column::ExpiresAt.gt(now))
            .exec_with_returning(&self.db)
            .await
            .context("increment otp attempts")?;
        Ok(updated.first().map(|model| model.attempts))
    }

    async fn mark_verified(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AuthServiceError> {
        let result = otp_challenges::Entity::update_many()
            .col_expr(otp_challenges::Column::Verified, Expr::value(true))
            .col_expr(otp_challenges::Column::UpdatedAt, Expr::value(now))
            .filter(otp_challenges::Column::Id.eq(id))
            .filter(otp_challenges::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .context("mark otp challenge verified")?;
        Ok(result.rows_affected == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        otp_challenges::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete otp challenge")?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let result = otp_challenges::Entity::delete_many()
            .filter(otp_challenges::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired otp challenges")?;
        Ok(result.rows_affected)
    }
}

fn challenge_from_model(model: otp_challenges::Model) -> Result<OtpChallenge, AuthServiceError> {
    let purpose = model
        .purpose
        .parse::<OtpPurpose>()
        .with_context(|| format!("otp challenge {} has unknown purpose", model.id))?;
    Ok(OtpChallenge {
        id: model.id,
        phone_number: model.phone_number,
        code: model.code,
        purpose,
        attempts: model.attempts,
        verified: model.verified,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await
            .context("find user by phone")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            phone_number: Set(user.phone_number.clone()),
            role: Set(user.role.as_u8() as i16),
            is_phone_verified: Set(user.is_phone_verified),
            is_welcome_done: Set(user.is_welcome_done),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthServiceError::PhoneNumberTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn mark_phone_verified(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(id),
            is_phone_verified: Set(true),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await;
        updated_user(result, "mark phone verified")
    }

    async fn set_welcome_done(
        &self,
        id: Uuid,
        done: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(id),
            is_welcome_done: Set(done),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await;
        updated_user(result, "set welcome status")
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// `update` on a missing primary key yields `RecordNotUpdated`.
fn updated_user(
    result: Result<users::Model, DbErr>,
    what: &'static str,
) -> Result<Option<User>, AuthServiceError> {
    match result {
        Ok(model) => Ok(Some(user_from_model(model))),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context(what).into()),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        phone_number: model.phone_number,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or_default(),
        is_phone_verified: model.is_phone_verified,
        is_welcome_done: model.is_welcome_done,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Refresh token repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRefreshTokenRepository {
    pub db: DatabaseConnection,
}

impl RefreshTokenRepository for DbRefreshTokenRepository {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        refresh_tokens::ActiveModel {
            id: Set(record.id),
            user_id: Set(record.user_id),
            token: Set(record.token.clone()),
            expires_at: Set(record.expires_at),
            blacklisted: Set(record.blacklisted),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create refresh token")?;
        Ok(())
    }

    async fn find_active(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        let model = refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::Token.eq(token))
            .filter(refresh_tokens::Column::Blacklisted.eq(false))
            .one(&self.db)
            .await
            .context("find refresh token")?;
        Ok(model.map(refresh_token_from_model))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        refresh_tokens::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete refresh token")?;
        Ok(())
    }
}

fn refresh_token_from_model(model: refresh_tokens::Model) -> RefreshTokenRecord {
    RefreshTokenRecord {
        id: model.id,
        user_id: model.user_id,
        token: model.token,
        expires_at: model.expires_at,
        blacklisted: model.blacklisted,
        created_at: model.created_at,
    }
}
