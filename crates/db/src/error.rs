//! Conversion of `SeaORM` errors into destination errors.

use nucleus_core::DestinationError;
use sea_orm::{DbErr, RuntimeErr};

/// Wraps a database error, naming the violated constraint when Postgres
/// reports one.
pub fn database_error(err: DbErr) -> DestinationError {
    let detail = match &err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db))) => {
            match (db.code(), db.constraint()) {
                (Some(code), Some(constraint)) => {
                    Some(format!("{} [{code}, constraint {constraint}]", db.message()))
                }
                (Some(code), None) => Some(format!("{} [{code}]", db.message())),
                _ => None,
            }
        }
        _ => None,
    };
    DestinationError::Database(detail.unwrap_or_else(|| err.to_string()))
}
