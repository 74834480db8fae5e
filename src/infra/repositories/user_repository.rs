//! User repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

/// User repository trait for dependency injection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Lookup by normalized email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>>;

    async fn create(&self, user: User) -> AppResult<User>;

    /// Overwrite name and password of an account that has not verified yet
    async fn update_registration(
        &self,
        id: Uuid,
        name: String,
        password_hash: String,
    ) -> AppResult<User>;

    async fn mark_email_verified(&self, id: Uuid) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Drop the password so the account can only sign in through Google
    async fn clear_password(&self, id: Uuid) -> AppResult<()>;

    /// Attach a Google subject; Google has verified the email on our behalf.
    /// Fails with Conflict when another subject is already linked.
    async fn link_google(&self, id: Uuid, google_id: String) -> AppResult<User>;
}

/// SeaORM implementation of UserRepository, on the pool or inside a transaction
pub struct UserStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> UserStore<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    async fn active_model(&self, id: Uuid) -> AppResult<ActiveModel> {
        let model = UserEntity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(model.into())
    }
}

#[async_trait]
impl<'c, C: ConnectionTrait> UserRepository for UserStore<'c, C> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::GoogleId.eq(google_id))
            .one(self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn create(&self, user: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            name: Set(user.name),
            password_hash: Set(user.password_hash),
            google_id: Set(user.google_id),
            company_id: Set(user.company_id),
            email_verified: Set(user.email_verified),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };

        let model = active_model.insert(self.db).await?;
        Ok(User::from(model))
    }

    async fn update_registration(
        &self,
        id: Uuid,
        name: String,
        password_hash: String,
    ) -> AppResult<User> {
        let mut active = self.active_model(id).await?;
        active.name = Set(name);
        active.password_hash = Set(Some(password_hash));
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db).await?;
        Ok(User::from(model))
    }

    async fn mark_email_verified(&self, id: Uuid) -> AppResult<User> {
        let mut active = self.active_model(id).await?;
        active.email_verified = Set(true);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db).await?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active = self.active_model(id).await?;
        active.password_hash = Set(Some(password_hash));
        active.updated_at = Set(Utc::now());

        active.update(self.db).await?;
        Ok(())
    }

    async fn clear_password(&self, id: Uuid) -> AppResult<()> {
        let mut active = self.active_model(id).await?;
        active.password_hash = Set(None);
        active.updated_at = Set(Utc::now());

        active.update(self.db).await?;
        Ok(())
    }

    async fn link_google(&self, id: Uuid, google_id: String) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if model
            .google_id
            .as_deref()
            .is_some_and(|linked| linked != google_id)
        {
            return Err(AppError::conflict("Google account link"));
        }

        let mut active: ActiveModel = model.into();
        active.google_id = Set(Some(google_id));
        active.email_verified = Set(true);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db).await?;
        Ok(User::from(model))
    }
}
