//! Database migration command.
//!
//! Applies `crates/api/migrations/*.sql` in order. Already-applied migrations
//! are skipped.

use sqlx::PgPool;

use super::CommandError;

/// Run all pending migrations.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
