//! Verification code entity.

use sea_orm::entity::prelude::*;

use crate::domain::OtpCode;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub purpose: String,
    pub attempts: i32,
    pub expires_at: DateTimeUtc,
    pub consumed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OtpCode {
    fn from(model: Model) -> Self {
        OtpCode {
            id: model.id,
            user_id: model.user_id,
            code_hash: model.code_hash,
            purpose: model.purpose,
            attempts: model.attempts,
            expires_at: model.expires_at,
            consumed_at: model.consumed_at,
            created_at: model.created_at,
        }
    }
}
