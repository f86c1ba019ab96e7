//! ODBC connection to one Access database file.

use std::path::Path;

use nucleus_core::{ColumnInfo, LegacySource, RowSet, SourceError, SourceProvider};
use nucleus_shared::LegacySourceConfig;
use odbc_api::{
    Connection, ConnectionOptions, Cursor, CursorRow, DataType, Environment, ResultSetMetadata,
};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::decode::{decode_cell, text_from_wide};

/// One ODBC environment per process; connections borrow it for `'static`.
static ENVIRONMENT: OnceCell<Environment> = OnceCell::new();

fn environment() -> Result<&'static Environment, odbc_api::Error> {
    ENVIRONMENT.get_or_try_init(Environment::new)
}

/// Result-set positions defined by `SQLTables` and `SQLColumns`.
const TABLES_NAME: u16 = 3;
const COLUMNS_NAME: u16 = 4;
const COLUMNS_TYPE_NAME: u16 = 6;
const COLUMNS_SIZE: u16 = 7;
const COLUMNS_NULLABLE: u16 = 11;

/// Builds the ODBC connection string for an Access file.
#[must_use]
pub fn connection_string(driver: &str, path: &Path) -> String {
    format!("Driver={{{driver}}};DBQ={};", path.display())
}

/// Quotes a table name for Access SQL: `[name]`, with `]` doubled.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Opens Access databases through an ODBC driver.
#[derive(Debug, Clone)]
pub struct OdbcProvider {
    driver: String,
}

impl OdbcProvider {
    /// Creates a provider for the named ODBC driver.
    #[must_use]
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
        }
    }
}

impl SourceProvider for OdbcProvider {
    fn open(&self, config: &LegacySourceConfig) -> Result<Box<dyn LegacySource>, SourceError> {
        let source = OdbcSource::connect(&self.driver, &config.path)?;
        Ok(Box::new(source))
    }
}

/// An open Access database. The connection closes on drop.
pub struct OdbcSource {
    connection: Connection<'static>,
}

impl std::fmt::Debug for OdbcSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdbcSource").finish_non_exhaustive()
    }
}

impl OdbcSource {
    /// Connects to a database file.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connect` if the environment cannot be allocated
    /// or the driver refuses the file.
    pub fn connect(driver: &str, path: &Path) -> Result<Self, SourceError> {
        let connect_error = |e: odbc_api::Error| SourceError::Connect {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let connection = environment()
            .map_err(connect_error)?
            .connect_with_connection_string(
                &connection_string(driver, path),
                ConnectionOptions::default(),
            )
            .map_err(connect_error)?;

        debug!(path = %path.display(), "Connected to legacy database");
        Ok(Self { connection })
    }
}

impl LegacySource for OdbcSource {
    fn table_names(&self) -> Result<Vec<String>, SourceError> {
        let catalog_error = |e: odbc_api::Error| SourceError::query("<catalog>", e);

        let mut cursor = self
            .connection
            .tables("", "", "", "TABLE")
            .map_err(catalog_error)?;

        let mut names = Vec::new();
        let mut buf = Vec::new();
        while let Some(mut row) = cursor.next_row().map_err(catalog_error)? {
            if let Some(name) = read_text(&mut row, TABLES_NAME, &mut buf).map_err(catalog_error)? {
                // Some drivers report system tables under type TABLE.
                if !name.starts_with("MSys") {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, SourceError> {
        let query_error = |e: odbc_api::Error| SourceError::query(table, e);

        let mut cursor = self
            .connection
            .columns("", "", table, "")
            .map_err(query_error)?;

        let mut columns = Vec::new();
        let mut buf = Vec::new();
        while let Some(mut row) = cursor.next_row().map_err(query_error)? {
            let name = read_text(&mut row, COLUMNS_NAME, &mut buf).map_err(query_error)?;
            let type_name = read_text(&mut row, COLUMNS_TYPE_NAME, &mut buf).map_err(query_error)?;
            let size = read_text(&mut row, COLUMNS_SIZE, &mut buf).map_err(query_error)?;
            let nullable = read_text(&mut row, COLUMNS_NULLABLE, &mut buf).map_err(query_error)?;

            columns.push(ColumnInfo {
                name: name.unwrap_or_default(),
                type_name: type_name.unwrap_or_default(),
                size: size.and_then(|s| s.trim().parse().ok()),
                nullable: nullable.map(|n| n.trim() != "0"),
            });
        }
        Ok(columns)
    }

    fn count_rows(&self, table: &str) -> Result<u64, SourceError> {
        let query_error = |e: odbc_api::Error| SourceError::query(table, e);
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));

        let Some(mut cursor) = self
            .connection
            .execute(&sql, (), None)
            .map_err(query_error)?
        else {
            return Err(SourceError::query(table, "COUNT(*) returned no result set"));
        };

        let mut buf = Vec::new();
        let Some(mut row) = cursor.next_row().map_err(query_error)? else {
            return Err(SourceError::query(table, "COUNT(*) returned no rows"));
        };
        let count = read_text(&mut row, 1, &mut buf).map_err(query_error)?;
        count
            .as_deref()
            .unwrap_or("0")
            .trim()
            .parse()
            .map_err(|e| SourceError::query(table, format!("invalid row count: {e}")))
    }

    fn fetch_all(&self, table: &str) -> Result<RowSet, SourceError> {
        let query_error = |e: odbc_api::Error| SourceError::query(table, e);
        let sql = format!("SELECT * FROM {}", quote_identifier(table));

        let Some(mut cursor) = self
            .connection
            .execute(&sql, (), None)
            .map_err(query_error)?
        else {
            return Ok(RowSet::default());
        };

        let columns: Vec<String> = cursor
            .column_names()
            .map_err(query_error)?
            .collect::<Result<_, _>>()
            .map_err(query_error)?;
        let mut types: Vec<DataType> = Vec::with_capacity(columns.len());
        for index in 1..=columns.len() {
            let index = u16::try_from(index)
                .map_err(|_| SourceError::query(table, "too many columns"))?;
            types.push(cursor.col_data_type(index).map_err(query_error)?);
        }

        let mut rows = Vec::new();
        let mut buf = Vec::new();
        while let Some(mut row) = cursor.next_row().map_err(query_error)? {
            let mut values = Vec::with_capacity(columns.len());
            for (index, (column, data_type)) in (1u16..).zip(columns.iter().zip(&types)) {
                let text = read_text(&mut row, index, &mut buf).map_err(query_error)?;
                let value =
                    decode_cell(*data_type, text.as_deref()).map_err(|message| {
                        SourceError::Decode {
                            table: table.to_string(),
                            column: column.clone(),
                            message,
                        }
                    })?;
                values.push(value);
            }
            rows.push(values);
        }

        debug!(table = %table, rows = rows.len(), "Fetched legacy rows");
        Ok(RowSet { columns, rows })
    }
}

/// Reads a column of the current row as UTF-16 text; `None` for NULL.
///
/// Narrow reads come back in the driver's codepage (cp1250 for the Access
/// driver), so text is always fetched wide.
fn read_text(
    row: &mut CursorRow<'_>,
    column: u16,
    buf: &mut Vec<u16>,
) -> Result<Option<String>, odbc_api::Error> {
    buf.clear();
    let present = row.get_wide_text(column, buf)?;
    Ok(present.then(|| text_from_wide(buf)))
}
