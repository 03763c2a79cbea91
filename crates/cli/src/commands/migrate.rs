//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront database (falls back to `DATABASE_URL`)
//! - `ADMIN_DATABASE_URL` - admin database (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`
//! Admin migrations: `crates/admin/migrations/`
//!
//! Both sets may run against the same database. Versions never collide, and
//! each migrator ignores versions applied by the other.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns error if the database URL is missing, the connection fails or a
/// migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    run(
        "storefront",
        "STOREFRONT_DATABASE_URL",
        sqlx::migrate!("../storefront/migrations"),
    )
    .await
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns error if the database URL is missing, the connection fails or a
/// migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    run(
        "admin",
        "ADMIN_DATABASE_URL",
        sqlx::migrate!("../admin/migrations"),
    )
    .await
}

async fn run(
    name: &str,
    url_var: &'static str,
    mut migrator: Migrator,
) -> Result<(), MigrationError> {
    let database_url = database_url(url_var)?;

    tracing::info!("Connecting to {name} database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!(count = migrator.iter().count(), "Running {name} migrations...");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("{name} migrations complete");
    Ok(())
}

/// Resolve a database URL with fallback to `DATABASE_URL`.
fn database_url(primary: &'static str) -> Result<String, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var(primary)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar(primary))
}
