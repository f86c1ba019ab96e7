//! Entity migrators.
//!
//! Every migrator follows the same pattern: probe the entity's candidate
//! legacy tables in order, fetch the first non-empty one, map each row
//! through the entity's alias table, and hand the whole batch to the
//! [`Destination`] in one transaction. The result is reported as a
//! [`MigrationOutcome`] instead of being swallowed.

mod context;
mod memory;
mod summary;

use async_trait::async_trait;
use nucleus_shared::EntityKind;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::mapping::{CompanyRecord, EntityMapper, InvoiceRecord, ProductRecord};
use crate::source::{LegacySource, SourceError};
use crate::value::MappingError;

pub use context::MigrationContext;
pub use memory::MemoryDestination;
pub use summary::{RunSummary, StageFailure};

/// Errors raised by the destination database.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// A statement or the commit failed; the batch was rolled back.
    #[error("Database error: {0}")]
    Database(String),

    /// A get-or-create lookup returned nothing.
    #[error("Could not resolve {0}")]
    Unresolved(String),
}

/// Errors that void an entity batch.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Reading the matched legacy table failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A row could not be mapped.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Writing the batch failed.
    #[error(transparent)]
    Destination(#[from] DestinationError),
}

/// Mapped rows of one entity, ready to upsert.
#[derive(Debug, Clone)]
pub enum MigrationBatch {
    /// Upsert on `tax_number`; conflicts update `name`, `address`, `city`.
    Companies(Vec<CompanyRecord>),
    /// Upsert on `code`; conflicts update `name`, `selling_price`, `stock_quantity`.
    Products {
        /// Name of the category every product is filed under.
        category: String,
        /// Rows.
        rows: Vec<ProductRecord>,
    },
    /// Upsert on `invoice_number`; conflicts update `total_amount`, `vat_amount`.
    Invoices {
        /// Company created for the invoices when no company exists yet.
        placeholder_company: String,
        /// Country given to the placeholder company when it is created.
        country: String,
        /// Rows.
        rows: Vec<InvoiceRecord>,
    },
}

impl MigrationBatch {
    /// Entity of the rows.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Companies(_) => EntityKind::Company,
            Self::Products { .. } => EntityKind::Product,
            Self::Invoices { .. } => EntityKind::Invoice,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Companies(rows) => rows.len(),
            Self::Products { rows, .. } => rows.len(),
            Self::Invoices { rows, .. } => rows.len(),
        }
    }

    /// Returns true when there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The destination database.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Upserts a batch in a single transaction.
    ///
    /// Either every row is written and committed, or the transaction is
    /// rolled back and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement or the commit fails.
    async fn upsert(&self, batch: MigrationBatch) -> Result<u64, DestinationError>;
}

/// What one entity migrator did with one legacy source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    /// Legacy source name.
    pub source: String,
    /// Entity migrated.
    pub entity: EntityKind,
    /// Candidate table that matched, if any.
    pub matched_table: Option<String>,
    /// Rows fetched from the matched table.
    pub rows_read: u64,
    /// Rows written to the destination.
    pub rows_migrated: u64,
    /// Rows dropped because a required field was missing.
    pub rows_skipped: u64,
    /// Why the batch was voided.
    pub error: Option<String>,
}

impl MigrationOutcome {
    fn new(source: &str, entity: EntityKind) -> Self {
        Self {
            source: source.to_string(),
            entity,
            matched_table: None,
            rows_read: 0,
            rows_migrated: 0,
            rows_skipped: 0,
            error: None,
        }
    }

    /// Returns true when the batch failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Returns the first candidate table that exists and has rows.
///
/// Missing tables are not errors; the next candidate is tried.
pub fn probe_candidates(source: &dyn LegacySource, candidates: &[&str]) -> Option<(String, u64)> {
    for candidate in candidates {
        match source.count_rows(candidate) {
            Ok(0) => debug!(table = %candidate, "Candidate table is empty"),
            Ok(count) => return Some(((*candidate).to_string(), count)),
            Err(e) => debug!(table = %candidate, error = %e, "Candidate table unavailable"),
        }
    }
    None
}

/// Migrates one entity from one legacy source.
///
/// Never fails: errors are logged and recorded in the outcome, and any
/// partially written batch has already been rolled back by the destination.
pub async fn migrate_entity<M: EntityMapper>(
    source_name: &str,
    source: &dyn LegacySource,
    destination: &dyn Destination,
    ctx: &mut MigrationContext,
) -> MigrationOutcome {
    let mut outcome = MigrationOutcome::new(source_name, M::KIND);

    let Some((table, count)) = probe_candidates(source, M::CANDIDATE_TABLES) else {
        info!(source = %source_name, entity = %M::KIND, "No candidate table found, skipping");
        return outcome;
    };
    info!(source = %source_name, entity = %M::KIND, table = %table, rows = count, "Found records");
    outcome.matched_table = Some(table.clone());

    if let Err(e) = run_batch::<M>(&table, source, destination, ctx, &mut outcome).await {
        error!(
            source = %source_name,
            entity = %M::KIND,
            table = %table,
            error = %e,
            "Migration failed, batch rolled back"
        );
        outcome.rows_migrated = 0;
        outcome.error = Some(e.to_string());
    } else {
        info!(
            source = %source_name,
            entity = %M::KIND,
            migrated = outcome.rows_migrated,
            skipped = outcome.rows_skipped,
            "Migrated records"
        );
    }

    outcome
}

async fn run_batch<M: EntityMapper>(
    table: &str,
    source: &dyn LegacySource,
    destination: &dyn Destination,
    ctx: &mut MigrationContext,
    outcome: &mut MigrationOutcome,
) -> Result<(), MigrationError> {
    let rows = source.fetch_all(table)?;
    outcome.rows_read = rows.len() as u64;

    let plan = M::aliases().plan(&rows.columns);
    let recognized: Vec<_> = plan.recognized().map(|(column, _)| column).collect();
    debug!(table = %table, columns = ?rows.columns, recognized = ?recognized, "Resolved columns");
    if recognized.is_empty() {
        warn!(table = %table, entity = %M::KIND, "No recognizable columns");
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows.rows {
        match M::build(&plan.extract(row), ctx)? {
            Some(record) => records.push(record),
            None => outcome.rows_skipped += 1,
        }
    }

    if records.is_empty() {
        return Ok(());
    }

    outcome.rows_migrated = destination.upsert(M::into_batch(records, ctx)).await?;
    Ok(())
}
