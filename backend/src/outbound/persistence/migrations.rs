//! Embedded schema migrations applied at start-up.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tokio::task;
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while bringing the schema up to date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("database migration failed: {message}")]
pub struct MigrationError {
    message: String,
}

impl MigrationError {
    fn new(error: impl std::fmt::Display) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// Apply every pending migration over a dedicated synchronous connection.
///
/// Runs on Tokio's blocking pool because the migration harness needs a
/// synchronous Diesel connection.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let database_url = database_url.to_owned();
    task::spawn_blocking(move || {
        let mut connection = PgConnection::establish(&database_url).map_err(MigrationError::new)?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(MigrationError::new)?;
        info!(applied = applied.len(), "database migrations applied");
        Ok(())
    })
    .await
    .map_err(MigrationError::new)?
}
