//! Migration logic for Nucleus.
//!
//! This crate contains the extract-transform-load rules with ZERO driver
//! dependencies. Legacy databases are reached through [`source::LegacySource`]
//! and the destination through [`migrate::Destination`]; the ODBC and
//! PostgreSQL implementations live in `nucleus-legacy` and `nucleus-db`.
//!
//! # Modules
//!
//! - `value` - Untyped legacy cell values and their coercions
//! - `source` - Read-only legacy database abstraction
//! - `structure` - Structure analysis report
//! - `mapping` - Alias tables and per-entity row mappers
//! - `sequence` - Run-scoped code synthesis
//! - `migrate` - Entity migrators, outcomes, and the in-memory destination
//! - `pipeline` - Stage ordering across configured sources
//! - `report` - JSON report files

pub mod mapping;
pub mod migrate;
pub mod pipeline;
pub mod report;
pub mod sequence;
pub mod source;
pub mod structure;
pub mod value;

#[cfg(test)]
mod fixture;
#[cfg(test)]
mod tests;

pub use migrate::{
    Destination, DestinationError, MemoryDestination, MigrationBatch, MigrationContext,
    MigrationError, MigrationOutcome, RunSummary,
};
pub use pipeline::Pipeline;
pub use source::{ColumnInfo, LegacySource, RowSet, SourceError, SourceProvider};
pub use structure::StructureReport;
pub use value::{LegacyValue, MappingError};
