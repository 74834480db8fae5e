//! Migrate command - Schema management for users, OTP codes and reset tokens.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // `serve` migrates on startup; here every step is explicit
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            tracing::info!("Applying pending migrations...");
            db.run_migrations().await.map_err(migration_error)?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back last migration...");
            db.rollback_migration().await.map_err(migration_error)?;
            tracing::info!("Rollback completed");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(migration_error)?;
            let pending = status.iter().filter(|m| !m.applied).count();

            for migration in &status {
                let state = if migration.applied { "applied" } else { "pending" };
                println!("{:<8} {}", state, migration.name);
            }
            println!();
            println!("{} of {} migrations pending", pending, status.len());
        }
        MigrateAction::Fresh { force } => {
            if !force {
                return Err(AppError::BadRequest(
                    "`migrate fresh` drops every table; re-run with --force".to_string(),
                ));
            }
            tracing::warn!("Dropping all tables and re-running migrations...");
            db.fresh_migrations().await.map_err(migration_error)?;
            tracing::info!("Fresh schema created");
        }
    }

    Ok(())
}

fn migration_error(err: DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", err))
}
