//! Structure analysis of legacy databases.
//!
//! Produces a diagnostic inventory (source → table → columns and row count)
//! for human review. Nothing downstream reads it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::report::{ReportError, write_json_report};
use crate::source::{ColumnInfo, LegacySource, SourceError};

/// Number of column names echoed to the log per table.
const SAMPLE_FIELDS: usize = 5;

/// A column that looks like a reference to another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRelation {
    /// Referencing column.
    pub column: String,
    /// Table name guessed from the column name.
    pub possible_table: String,
}

/// Inventory of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TableReport {
    /// The table was read.
    Analyzed {
        /// Column metadata.
        columns: Vec<ColumnInfo>,
        /// Exact row count.
        row_count: u64,
        /// Columns that look like foreign keys.
        relations: Vec<ColumnRelation>,
    },
    /// Reading the table failed; the scan went on.
    Failed {
        /// Error message.
        error: String,
    },
}

/// Inventory of one legacy database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStructure {
    /// Number of user tables.
    pub table_count: usize,
    /// Per-table inventory.
    pub tables: BTreeMap<String, TableReport>,
}

/// The structure analysis report: source name → inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StructureReport {
    sources: BTreeMap<String, SourceStructure>,
}

impl StructureReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source's inventory.
    pub fn insert(&mut self, source: impl Into<String>, structure: SourceStructure) {
        self.sources.insert(source.into(), structure);
    }

    /// Inventory of one source.
    #[must_use]
    pub fn source(&self, name: &str) -> Option<&SourceStructure> {
        self.sources.get(name)
    }

    /// Number of analyzed sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true when no source was analyzed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Writes the report as pretty JSON, replacing any previous report.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        write_json_report(path, self)
    }
}

/// Scans every table of a source.
///
/// A table that cannot be read is recorded as failed and the scan continues.
///
/// # Errors
///
/// Returns an error only if the table list itself cannot be read.
pub fn analyze_source(
    name: &str,
    source: &dyn LegacySource,
) -> Result<SourceStructure, SourceError> {
    let tables = source.table_names()?;
    info!(source = %name, tables = tables.len(), "Analyzing database");

    let mut structure = SourceStructure {
        table_count: tables.len(),
        tables: BTreeMap::new(),
    };

    for table in tables {
        let report = match analyze_table(source, &table) {
            Ok(report) => report,
            Err(e) => {
                warn!(source = %name, table = %table, error = %e, "Error reading table");
                TableReport::Failed {
                    error: e.to_string(),
                }
            }
        };
        structure.tables.insert(table, report);
    }

    Ok(structure)
}

fn analyze_table(source: &dyn LegacySource, table: &str) -> Result<TableReport, SourceError> {
    let columns = source.columns(table)?;
    let row_count = source.count_rows(table)?;

    let sample: Vec<_> = columns
        .iter()
        .take(SAMPLE_FIELDS)
        .map(|c| c.name.as_str())
        .collect();
    info!(
        table = %table,
        columns = columns.len(),
        rows = row_count,
        sample_fields = %sample.join(", "),
        "Table analyzed"
    );

    let relations = columns
        .iter()
        .filter_map(|c| infer_relation(&c.name))
        .collect();

    Ok(TableReport::Analyzed {
        columns,
        row_count,
        relations,
    })
}

/// Guesses the referenced table from `ID_X` / `X_ID` column names.
#[must_use]
pub fn infer_relation(column: &str) -> Option<ColumnRelation> {
    let upper = column.to_uppercase();
    let target = upper
        .strip_prefix("ID_")
        .or_else(|| upper.strip_suffix("_ID"))?;
    if target.is_empty() {
        return None;
    }
    Some(ColumnRelation {
        column: column.to_string(),
        possible_table: target.to_string(),
    })
}
