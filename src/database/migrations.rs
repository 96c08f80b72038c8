//! # Database Migrations
//!
//! Schema for `sj_job` and `sj_group_config`, embedded from `migrations/` at
//! compile time and applied with the SQLx migrator. The migrator tracks
//! applied versions in `_sqlx_migrations` and takes an advisory lock, so
//! concurrent callers are safe.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Manages database schema migrations.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run all outstanding migrations in order
    pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        MIGRATOR.run(pool).await?;
        info!(known = MIGRATOR.iter().count(), "Database migrations applied");
        Ok(())
    }
}
