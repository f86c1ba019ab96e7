//! Read-only access to a legacy database.

use nucleus_shared::LegacySourceConfig;
use serde::Serialize;
use thiserror::Error;

use crate::value::LegacyValue;

/// Errors raised by a legacy source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The database file could not be opened.
    #[error("Cannot open {path}: {message}")]
    Connect {
        /// Path of the database file.
        path: String,
        /// Driver message.
        message: String,
    },

    /// A catalog or data query failed (e.g. the table does not exist).
    #[error("Query on {table} failed: {message}")]
    Query {
        /// Table the query ran against.
        table: String,
        /// Driver message.
        message: String,
    },

    /// A cell could not be decoded.
    #[error("Cannot decode {table}.{column}: {message}")]
    Decode {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Decoder message.
        message: String,
    },
}

impl SourceError {
    /// Builds a `Query` error.
    pub fn query(table: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Query {
            table: table.into(),
            message: message.to_string(),
        }
    }
}

/// Column metadata as reported by the legacy catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type name (e.g. `VARCHAR`, `CURRENCY`).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Declared size, when the driver reports one.
    pub size: Option<u64>,
    /// Nullability, when the driver reports it.
    pub nullable: Option<bool>,
}

/// All rows of a table together with its column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Rows; each has one value per column.
    pub rows: Vec<Vec<LegacyValue>>,
}

impl RowSet {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An open, read-only legacy database.
///
/// Implementations release their connection when dropped.
pub trait LegacySource {
    /// User tables, excluding system tables and views.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn table_names(&self) -> Result<Vec<String>, SourceError>;

    /// Column metadata for one table.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, SourceError>;

    /// Exact row count (`SELECT COUNT(*)`).
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not exist or cannot be read.
    fn count_rows(&self, table: &str) -> Result<u64, SourceError>;

    /// Every row of a table (`SELECT *`).
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not exist or a value cannot be decoded.
    fn fetch_all(&self, table: &str) -> Result<RowSet, SourceError>;
}

/// Opens configured legacy sources.
pub trait SourceProvider {
    /// Returns true when the source's file is present.
    fn exists(&self, config: &LegacySourceConfig) -> bool {
        config.path.exists()
    }

    /// Opens a source.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connect` if the file cannot be opened.
    fn open(&self, config: &LegacySourceConfig) -> Result<Box<dyn LegacySource>, SourceError>;
}
