//! Shared types, errors, and configuration for the Nucleus migration tool.
//!
//! This crate provides common types used across all other crates:
//! - Money rounding and VAT helpers backed by `rust_decimal`
//! - The `EntityKind` enumeration of migrated destination entities
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LegacyConfig, LegacySourceConfig, MigrationConfig};
pub use error::AppError;
pub use types::EntityKind;
