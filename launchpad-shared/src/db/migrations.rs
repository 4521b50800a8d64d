/// Database migration runner
///
/// Runs schema migrations using sqlx's embedded migration system.
///
/// # Migration Files
///
/// Migrations live in the `migrations/` directory of this crate. Each
/// migration is a pair of files:
/// - `{timestamp}_{name}.up.sql` - The "up" migration
/// - `{timestamp}_{name}.down.sql` - The "down" migration (rollback)
///
/// # Example
///
/// ```no_run
/// use launchpad_shared::db::pool::{create_pool, DatabaseConfig};
/// use launchpad_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped; a failed migration
/// is rolled back and returned as an error.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the connection is
/// lost mid-run.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
