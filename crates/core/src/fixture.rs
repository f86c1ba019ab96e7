//! In-memory legacy sources and helpers for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use nucleus_shared::{LegacySourceConfig, MigrationConfig};

use crate::migrate::{Destination, DestinationError, MigrationBatch, MigrationContext};
use crate::source::{ColumnInfo, LegacySource, RowSet, SourceError, SourceProvider};
use crate::value::LegacyValue;

/// Date used as "today" in tests.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// A context with the default configuration.
pub fn context() -> MigrationContext {
    MigrationContext::new(&MigrationConfig::default(), test_today())
}

/// Splits `(column, value)` pairs into a column list and a single row.
pub fn row_of(cells: &[(&str, LegacyValue)]) -> (Vec<String>, Vec<LegacyValue>) {
    cells
        .iter()
        .map(|(column, value)| ((*column).to_string(), value.clone()))
        .unzip()
}

/// A legacy database held in memory. Table lookups ignore case, like Access.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: Vec<(String, Option<RowSet>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str], rows: Vec<Vec<LegacyValue>>) -> Self {
        self.tables.push((
            name.to_string(),
            Some(RowSet {
                columns: columns.iter().map(|c| (*c).to_string()).collect(),
                rows,
            }),
        ));
        self
    }

    /// A table that is listed but fails on every read.
    pub fn with_broken_table(mut self, name: &str) -> Self {
        self.tables.push((name.to_string(), None));
        self
    }

    fn table(&self, name: &str) -> Result<&RowSet, SourceError> {
        let (_, rows) = self
            .tables
            .iter()
            .find(|(table, _)| table.eq_ignore_ascii_case(name))
            .ok_or_else(|| SourceError::query(name, "no such table"))?;
        rows.as_ref()
            .ok_or_else(|| SourceError::query(name, "table is corrupt"))
    }
}

impl LegacySource for MemorySource {
    fn table_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, SourceError> {
        Ok(self
            .table(table)?
            .columns
            .iter()
            .map(|name| ColumnInfo {
                name: name.clone(),
                type_name: "VARCHAR".to_string(),
                size: Some(255),
                nullable: Some(true),
            })
            .collect())
    }

    fn count_rows(&self, table: &str) -> Result<u64, SourceError> {
        Ok(self.table(table)?.len() as u64)
    }

    fn fetch_all(&self, table: &str) -> Result<RowSet, SourceError> {
        self.table(table).cloned()
    }
}

/// Serves `MemorySource`s by configured source name.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    sources: HashMap<String, MemorySource>,
    unreachable: Vec<String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, name: &str, source: MemorySource) -> Self {
        self.sources.insert(name.to_string(), source);
        self
    }

    /// A source whose file exists but cannot be opened.
    pub fn with_unreachable(mut self, name: &str) -> Self {
        self.unreachable.push(name.to_string());
        self
    }
}

impl SourceProvider for MemoryProvider {
    fn exists(&self, config: &LegacySourceConfig) -> bool {
        self.sources.contains_key(&config.name) || self.unreachable.contains(&config.name)
    }

    fn open(&self, config: &LegacySourceConfig) -> Result<Box<dyn LegacySource>, SourceError> {
        self.sources
            .get(&config.name)
            .map(|source| Box::new(source.clone()) as Box<dyn LegacySource>)
            .ok_or_else(|| SourceError::Connect {
                path: config.path.display().to_string(),
                message: "driver not installed".to_string(),
            })
    }
}

/// A destination that rejects every batch.
#[derive(Debug, Default)]
pub struct FailingDestination;

#[async_trait]
impl Destination for FailingDestination {
    async fn upsert(&self, _batch: MigrationBatch) -> Result<u64, DestinationError> {
        Err(DestinationError::Database(
            "duplicate key value violates unique constraint".to_string(),
        ))
    }
}
