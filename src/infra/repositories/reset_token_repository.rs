//! Password reset token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::password_reset_token::{self, ActiveModel, Entity as ResetTokenEntity};
use crate::domain::PasswordResetToken;
use crate::errors::AppResult;

#[async_trait]
pub trait ResetTokenRepository: Send + Sync {
    /// Store a token under a caller-chosen id (the id is part of the emailed token)
    async fn create(
        &self,
        id: Uuid,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<PasswordResetToken>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PasswordResetToken>>;

    /// Returns false when the token was already used
    async fn mark_used(&self, id: Uuid) -> AppResult<bool>;

    /// Use up every outstanding token of the user
    async fn invalidate_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

pub struct ResetTokenStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> ResetTokenStore<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<'c, C: ConnectionTrait> ResetTokenRepository for ResetTokenStore<'c, C> {
    async fn create(
        &self,
        id: Uuid,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<PasswordResetToken> {
        let active_model = ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            used_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.db).await?;
        Ok(PasswordResetToken::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PasswordResetToken>> {
        let result = ResetTokenEntity::find_by_id(id).one(self.db).await?;
        Ok(result.map(PasswordResetToken::from))
    }

    async fn mark_used(&self, id: Uuid) -> AppResult<bool> {
        let result = ResetTokenEntity::update_many()
            .col_expr(password_reset_token::Column::UsedAt, Expr::value(Utc::now()))
            .filter(password_reset_token::Column::Id.eq(id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn invalidate_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = ResetTokenEntity::update_many()
            .col_expr(password_reset_token::Column::UsedAt, Expr::value(Utc::now()))
            .filter(password_reset_token::Column::UserId.eq(user_id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
