use sea_orm::entity::prelude::*;

/// One-time password challenge sent by SMS.
/// At most one unverified, unexpired row per (phone_number, purpose); rows past
/// `expires_at` are removed by the expiry sweeper.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phone_number: String,
    pub code: String,
    /// `phone_verification`, `login` or `password_reset`.
    pub purpose: String,
    pub attempts: i32,
    pub verified: bool,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
