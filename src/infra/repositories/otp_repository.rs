//! Verification code repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::otp_code::{self, ActiveModel, Entity as OtpEntity};
use crate::domain::OtpCode;
use crate::errors::AppResult;

#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        code_hash: String,
        purpose: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OtpCode>;

    /// Newest code of the given purpose that has not been consumed
    async fn latest_active(&self, user_id: Uuid, purpose: &str) -> AppResult<Option<OtpCode>>;

    /// Spend one attempt on an unconsumed code in a single conditional
    /// UPDATE. Returns false when the code is used up or consumed, so
    /// concurrent guesses can never exceed `max_attempts`.
    async fn reserve_attempt(&self, id: Uuid, max_attempts: i32) -> AppResult<bool>;

    /// Mark the code consumed. Returns false when another request got there first.
    async fn consume(&self, id: Uuid) -> AppResult<bool>;

    /// Consume every outstanding code of the user for a purpose
    async fn invalidate_all(&self, user_id: Uuid, purpose: &str) -> AppResult<u64>;
}

pub struct OtpStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> OtpStore<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<'c, C: ConnectionTrait> OtpRepository for OtpStore<'c, C> {
    async fn create(
        &self,
        user_id: Uuid,
        code_hash: String,
        purpose: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OtpCode> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            code_hash: Set(code_hash),
            purpose: Set(purpose.to_string()),
            attempts: Set(0),
            expires_at: Set(expires_at),
            consumed_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.db).await?;
        Ok(OtpCode::from(model))
    }

    async fn latest_active(&self, user_id: Uuid, purpose: &str) -> AppResult<Option<OtpCode>> {
        let result = OtpEntity::find()
            .filter(otp_code::Column::UserId.eq(user_id))
            .filter(otp_code::Column::Purpose.eq(purpose))
            .filter(otp_code::Column::ConsumedAt.is_null())
            .order_by_desc(otp_code::Column::CreatedAt)
            .one(self.db)
            .await?;
        Ok(result.map(OtpCode::from))
    }

    async fn reserve_attempt(&self, id: Uuid, max_attempts: i32) -> AppResult<bool> {
        let result = OtpEntity::update_many()
            .col_expr(
                otp_code::Column::Attempts,
                Expr::col(otp_code::Column::Attempts).add(1),
            )
            .filter(otp_code::Column::Id.eq(id))
            .filter(otp_code::Column::Attempts.lt(max_attempts))
            .filter(otp_code::Column::ConsumedAt.is_null())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn consume(&self, id: Uuid) -> AppResult<bool> {
        let result = OtpEntity::update_many()
            .col_expr(otp_code::Column::ConsumedAt, Expr::value(Utc::now()))
            .filter(otp_code::Column::Id.eq(id))
            .filter(otp_code::Column::ConsumedAt.is_null())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn invalidate_all(&self, user_id: Uuid, purpose: &str) -> AppResult<u64> {
        let result = OtpEntity::update_many()
            .col_expr(otp_code::Column::ConsumedAt, Expr::value(Utc::now()))
            .filter(otp_code::Column::UserId.eq(user_id))
            .filter(otp_code::Column::Purpose.eq(purpose))
            .filter(otp_code::Column::ConsumedAt.is_null())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
