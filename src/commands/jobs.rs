//! Jobs command - Email queue management.
//!
//! Verification codes and password reset links are queued by the API and
//! delivered by this worker:
//! - `work`: Start the email worker process
//! - `list`: Show queue counts by status
//! - `clear`: Remove failed jobs from the queue
//!
//! ```bash
//! genbot-api jobs work
//! genbot-api jobs list
//! genbot-api jobs clear
//! ```

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Failures shown by `jobs list`
const RECENT_FAILURES: u64 = 5;

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Start the email worker
///
/// Shares the queue tables the API pushes to; they are created on first use.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;

    use crate::config::JOB_WORKER_EMAIL;
    use crate::jobs::{email_job_handler, EmailQueue};

    tracing::info!("Connecting to job queue...");

    let queue = EmailQueue::connect(config).await?;

    tracing::info!("Email worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new(JOB_WORKER_EMAIL)
        .backend(queue.storage())
        .build_fn(email_job_handler);

    // Run with graceful shutdown on Ctrl+C
    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Email worker stopped.");
    Ok(())
}

/// Print queue counts by status and the latest delivery failures.
async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_exists(&db).await? {
        println!("Email queue not initialized.");
        println!("Run 'jobs work' or 'serve' first to create the queue tables.");
        return Ok(());
    }

    let counts = db
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text AS status, COUNT(*)::bigint AS count \
             FROM apalis.jobs GROUP BY status ORDER BY status"
                .to_string(),
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    println!("Email queue");
    if counts.is_empty() {
        println!("  (empty)");
    }
    for row in counts {
        let status: String = row.try_get("", "status").unwrap_or_default();
        let count: i64 = row.try_get("", "count").unwrap_or_default();
        println!("  {:<10} {}", status, count);
    }

    let failures = db
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            format!(
                "SELECT id, attempts, COALESCE(last_error, '') AS last_error \
                 FROM apalis.jobs WHERE status = 'Failed' \
                 ORDER BY done_at DESC NULLS LAST LIMIT {}",
                RECENT_FAILURES
            ),
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    if !failures.is_empty() {
        println!();
        println!("Recent failures");
        for row in failures {
            let id: String = row.try_get("", "id").unwrap_or_default();
            let attempts: i32 = row.try_get("", "attempts").unwrap_or_default();
            let error: String = row.try_get("", "last_error").unwrap_or_default();
            println!("  {} after {} attempt(s): {}", id, attempts, error);
        }
    }

    Ok(())
}

/// Drop emails that exhausted their retries
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_exists(&db).await? {
        println!("Email queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = db
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'".to_string(),
        ))
        .await
        .map_err(|e| AppError::internal(format!("Failed to clear jobs: {}", e)))?;

    println!("Cleared {} undeliverable email(s).", result.rows_affected());

    Ok(())
}

async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    tracing::info!("Connecting to database...");

    Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))
}

/// Whether apalis has created its schema yet
async fn queue_exists(db: &DatabaseConnection) -> AppResult<bool> {
    let result = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists".to_string(),
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    Ok(result
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}
