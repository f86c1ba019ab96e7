//! Stage ordering across the configured legacy sources.

use nucleus_shared::{AppConfig, AppError, EntityKind, LegacySourceConfig};
use tracing::{info, warn};

use crate::mapping::{CompanyMapper, InvoiceMapper, ProductMapper};
use crate::migrate::{Destination, MigrationContext, RunSummary, migrate_entity};
use crate::source::{LegacySource, SourceProvider};
use crate::structure::{StructureReport, analyze_source};

/// Runs structure analysis and the entity migrators for a configuration.
#[derive(Debug)]
pub struct Pipeline<'a> {
    config: &'a AppConfig,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over a configuration.
    #[must_use]
    pub const fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// Analyzes every configured source that exists on disk.
    ///
    /// Sources that are missing or cannot be opened are logged and left out
    /// of the report.
    pub fn analyze(&self, provider: &dyn SourceProvider) -> StructureReport {
        let mut report = StructureReport::new();

        for source_config in &self.config.legacy.sources {
            let Some(source) = open_source(provider, source_config) else {
                continue;
            };
            match analyze_source(&source_config.name, source.as_ref()) {
                Ok(structure) => report.insert(source_config.name.clone(), structure),
                Err(e) => warn!(source = %source_config.name, error = %e, "Could not list tables"),
            }
        }

        report
    }

    /// Migrates every configured entity of every source, in order.
    ///
    /// Sources that exist but cannot be opened are recorded as failures;
    /// missing files are skipped with a warning.
    pub async fn migrate(
        &self,
        provider: &dyn SourceProvider,
        destination: &dyn Destination,
        ctx: &mut MigrationContext,
        summary: &mut RunSummary,
    ) {
        for source_config in self.config.migration_sources() {
            if !provider.exists(source_config) {
                warn!(
                    source = %source_config.name,
                    path = %source_config.path.display(),
                    "Database not found, skipping"
                );
                continue;
            }

            let source = match provider.open(source_config) {
                Ok(source) => source,
                Err(e) => {
                    warn!(source = %source_config.name, error = %e, "Could not connect");
                    summary.record_failure(
                        "source",
                        Some(&source_config.name),
                        &AppError::SourceUnavailable(e.to_string()),
                    );
                    continue;
                }
            };

            info!(source = %source_config.name, "Migrating from source");
            migrate_source(
                &source_config.name,
                &source_config.entities,
                source.as_ref(),
                destination,
                ctx,
                summary,
            )
            .await;
        }
    }
}

fn open_source(
    provider: &dyn SourceProvider,
    config: &LegacySourceConfig,
) -> Option<Box<dyn LegacySource>> {
    if !provider.exists(config) {
        warn!(source = %config.name, path = %config.path.display(), "Database not found, skipping");
        return None;
    }
    match provider.open(config) {
        Ok(source) => Some(source),
        Err(e) => {
            warn!(source = %config.name, error = %e, "Could not connect");
            None
        }
    }
}

async fn migrate_source(
    name: &str,
    entities: &[EntityKind],
    source: &dyn LegacySource,
    destination: &dyn Destination,
    ctx: &mut MigrationContext,
    summary: &mut RunSummary,
) {
    // Companies before products before invoices, whatever the config order.
    for kind in EntityKind::ALL {
        if !entities.contains(&kind) {
            continue;
        }
        let outcome = match kind {
            EntityKind::Company => {
                migrate_entity::<CompanyMapper>(name, source, destination, ctx).await
            }
            EntityKind::Product => {
                migrate_entity::<ProductMapper>(name, source, destination, ctx).await
            }
            EntityKind::Invoice => {
                migrate_entity::<InvoiceMapper>(name, source, destination, ctx).await
            }
        };
        summary.record_outcome(outcome);
    }
}
