//! Unit of Work - single entry point to the account repositories.
//!
//! Services receive one `UnitOfWork` instead of each repository. Reads go
//! through the plain accessors; multi-step writes run inside `transaction`,
//! where every repository handed out by the `TransactionContext` shares one
//! database transaction that is committed when the closure succeeds and
//! rolled back when it fails.

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::repositories::{
    OtpRepository, OtpStore, ResetTokenRepository, ResetTokenStore, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Repository access and transactions for services.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository + '_>;

    fn otp_codes(&self) -> Arc<dyn OtpRepository + '_>;

    fn reset_tokens(&self) -> Arc<dyn ResetTokenRepository + '_>;

    /// Run `f` in a ReadCommitted transaction.
    ///
    /// The body must own what it captures; repositories come from the context.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repositories bound to one open transaction.
pub struct TransactionContext<'a> {
    users: Arc<dyn UserRepository + 'a>,
    otp_codes: Arc<dyn OtpRepository + 'a>,
    reset_tokens: Arc<dyn ResetTokenRepository + 'a>,
}

impl<'a> TransactionContext<'a> {
    pub fn new(
        users: Arc<dyn UserRepository + 'a>,
        otp_codes: Arc<dyn OtpRepository + 'a>,
        reset_tokens: Arc<dyn ResetTokenRepository + 'a>,
    ) -> Self {
        Self {
            users,
            otp_codes,
            reset_tokens,
        }
    }

    pub fn users(&self) -> Arc<dyn UserRepository + 'a> {
        self.users.clone()
    }

    pub fn otp_codes(&self) -> Arc<dyn OtpRepository + 'a> {
        self.otp_codes.clone()
    }

    pub fn reset_tokens(&self) -> Arc<dyn ResetTokenRepository + 'a> {
        self.reset_tokens.clone()
    }
}

/// Postgres-backed UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository + '_> {
        Arc::new(UserStore::new(&self.db))
    }

    fn otp_codes(&self) -> Arc<dyn OtpRepository + '_> {
        Arc::new(OtpStore::new(&self.db))
    }

    fn reset_tokens(&self) -> Arc<dyn ResetTokenRepository + '_> {
        Arc::new(ResetTokenStore::new(&self.db))
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(
            Arc::new(UserStore::new(&txn)),
            Arc::new(OtpStore::new(&txn)),
            Arc::new(ResetTokenStore::new(&txn)),
        );

        let outcome = f(ctx).await;
        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Run a block inside `UnitOfWork::transaction`, binding the context to `$ctx`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| {
            Box::pin(async move {
                let outcome: $crate::errors::AppResult<_> = $body;
                outcome
            })
        })
        .await
    };
}
