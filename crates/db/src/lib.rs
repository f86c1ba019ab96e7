//! PostgreSQL destination with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the four destination tables
//! - Repositories performing natural-key upserts and get-or-create lookups
//! - [`PgDestination`], the [`nucleus_core::Destination`] used by real runs

pub mod entities;
pub mod repositories;

mod destination;
mod error;

pub use destination::PgDestination;
pub use error::database_error;
pub use repositories::{CategoryRepository, CompanyRepository, InvoiceRepository, ProductRepository};

use std::time::Duration;

use nucleus_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the destination database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(url: &str, pool: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
