//! Background jobs processed by `jobs work`.
//!
//! The API only enqueues; delivery happens in the worker process.

mod email_job;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;
use async_trait::async_trait;

pub use email_job::{email_job_handler, EmailJob};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Outgoing mail seam used by the auth flows.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: EmailJob) -> AppResult<()>;
}

/// Mailer that pushes jobs onto the apalis Postgres queue.
#[derive(Clone)]
pub struct EmailQueue {
    storage: PostgresStorage<EmailJob>,
}

impl EmailQueue {
    /// Connect to the queue, creating the apalis tables when missing.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .map_err(|e| AppError::internal(format!("Failed to connect to job queue: {}", e)))?;

        PostgresStorage::setup(&pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

        Ok(Self {
            storage: PostgresStorage::new(pool),
        })
    }

    pub fn storage(&self) -> PostgresStorage<EmailJob> {
        self.storage.clone()
    }
}

#[async_trait]
impl Mailer for EmailQueue {
    async fn send(&self, email: EmailJob) -> AppResult<()> {
        let mut storage = self.storage.clone();
        let to = email.to.clone();

        storage
            .push(email)
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue email: {}", e)))?;

        tracing::debug!(to = %to, "Email queued");
        Ok(())
    }
}
