//! Application configuration management.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::EntityKind;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Legacy (Access) source configuration.
    #[serde(default)]
    pub legacy: LegacyConfig,
    /// Destination database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Migration behaviour and defaults.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Legacy source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyConfig {
    /// ODBC driver name used in the connection string.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Legacy database files, in the order they are analyzed and migrated.
    #[serde(default = "default_sources")]
    pub sources: Vec<LegacySourceConfig>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            sources: default_sources(),
        }
    }
}

fn default_driver() -> String {
    "Microsoft Access Driver (*.mdb, *.accdb)".to_string()
}

fn default_sources() -> Vec<LegacySourceConfig> {
    vec![
        LegacySourceConfig {
            name: "main".to_string(),
            path: PathBuf::from("backup-db/BazaBrain.mdb"),
            entities: vec![EntityKind::Company, EntityKind::Product, EntityKind::Invoice],
        },
        LegacySourceConfig {
            name: "harmon".to_string(),
            path: PathBuf::from("backup-db/HARMON.mdb"),
            entities: vec![EntityKind::Company, EntityKind::Product],
        },
        LegacySourceConfig {
            name: "fiscal".to_string(),
            path: PathBuf::from("backup-db/Fiskal_log.mdb"),
            entities: Vec::new(),
        },
    ]
}

/// A single legacy database file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacySourceConfig {
    /// Short name used in logs and reports (e.g. `main`).
    pub name: String,
    /// Path to the `.mdb`/`.accdb` file.
    pub path: PathBuf,
    /// Entities migrated from this source. Empty means analysis only.
    #[serde(default)]
    pub entities: Vec<EntityKind>,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL. Required unless running dry.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    1
}

fn default_min_connections() -> u32 {
    1
}

/// Migration behaviour and the defaults applied to incomplete legacy rows.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    /// Map every row but stage the result in memory instead of writing.
    #[serde(default)]
    pub dry_run: bool,
    /// Where the structure analysis report is written.
    #[serde(default = "default_structure_report_path")]
    pub structure_report_path: PathBuf,
    /// Where the run report is written.
    #[serde(default = "default_run_report_path")]
    pub run_report_path: PathBuf,
    /// Country assigned to every migrated company.
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Payment terms in days assigned to every migrated company.
    #[serde(default = "default_payment_terms")]
    pub default_payment_terms: i32,
    /// VAT rate in percent used for products without one.
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,
    /// Unit of measure used for products without one.
    #[serde(default = "default_unit")]
    pub default_unit: String,
    /// Name of the category every migrated product is filed under.
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Company created for invoices when the destination has no companies.
    #[serde(default = "default_placeholder_company")]
    pub placeholder_company: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            structure_report_path: default_structure_report_path(),
            run_report_path: default_run_report_path(),
            default_country: default_country(),
            default_payment_terms: default_payment_terms(),
            default_vat_rate: default_vat_rate(),
            default_unit: default_unit(),
            default_category: default_category(),
            placeholder_company: default_placeholder_company(),
        }
    }
}

fn default_structure_report_path() -> PathBuf {
    PathBuf::from("access_structure_analysis.json")
}

fn default_run_report_path() -> PathBuf {
    PathBuf::from("migration_report.json")
}

fn default_country() -> String {
    "Montenegro".to_string()
}

fn default_payment_terms() -> i32 {
    30
}

fn default_vat_rate() -> Decimal {
    Decimal::from(21)
}

fn default_unit() -> String {
    "piece".to_string()
}

fn default_category() -> String {
    "General".to_string()
}

fn default_placeholder_company() -> String {
    "Unknown client".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("NUCLEUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Returns the sources that have at least one entity to migrate.
    pub fn migration_sources(&self) -> impl Iterator<Item = &LegacySourceConfig> {
        self.legacy
            .sources
            .iter()
            .filter(|source| !source.entities.is_empty())
    }
}
