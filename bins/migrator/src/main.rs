//! Legacy data migrator for Nucleus.
//!
//! Moves companies, products and invoices out of the legacy Access databases
//! (BazaBrain, HARMON, Fiskal_log) into PostgreSQL. Runs once, without
//! arguments; settings come from `config/` and `NUCLEUS__*` variables.
//!
//! Exit status: 0 when every stage succeeded, 1 when any source,
//! destination, batch or report failed, 2 when the configuration cannot be
//! loaded or lists no sources. A missing `database.url` is a destination
//! failure: structure analysis still runs.

use std::process::ExitCode;

use anyhow::Context;
use nucleus_core::report::write_json_report;
use nucleus_core::{Destination, MemoryDestination, MigrationContext, Pipeline, RunSummary};
use nucleus_db::PgDestination;
use nucleus_legacy::OdbcProvider;
use nucleus_shared::{AppConfig, AppError, EntityKind};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "migrator=info,nucleus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(e) => {
            let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            error!(error = %format!("{e:#}"), "Migration aborted");
            ExitCode::from(code)
        }
    }
}

async fn run() -> anyhow::Result<RunSummary> {
    let config = AppConfig::load().map_err(AppError::from)?;
    validate(&config)?;

    info!("{}", "=".repeat(60));
    info!(dry_run = config.migration.dry_run, "Starting legacy data migration");
    info!("{}", "=".repeat(60));

    let mut summary = RunSummary::start(config.migration.dry_run);
    let provider = OdbcProvider::new(&config.legacy.driver);
    let pipeline = Pipeline::new(&config);

    info!("Stage 1: analyzing legacy database structure");
    let report = pipeline.analyze(&provider);
    let report_path = &config.migration.structure_report_path;
    match report.write_to(report_path) {
        Ok(()) => info!(
            path = %report_path.display(),
            sources = report.len(),
            "Structure analysis saved"
        ),
        Err(e) => {
            let err = AppError::Report(e.to_string());
            error!(code = err.error_code(), error = %err, "Could not save structure analysis");
            summary.record_failure("report", None, &err);
        }
    }

    info!("Stage 2: connecting to destination database");
    if let Some(destination) = open_destination(&config, &mut summary).await {
        info!("Stage 3: migrating data");
        let today = chrono::Local::now().date_naive();
        let mut ctx = MigrationContext::new(&config.migration, today);
        pipeline
            .migrate(&provider, destination.as_ref(), &mut ctx, &mut summary)
            .await;
    } else {
        warn!("Destination unavailable, migration skipped");
    }

    summary.finish();
    let run_report_path = &config.migration.run_report_path;
    if let Err(e) = write_json_report(run_report_path, &summary) {
        let err = AppError::Report(e.to_string());
        error!(code = err.error_code(), error = %err, "Could not save run report");
        summary.record_failure("report", None, &err);
    } else {
        info!(path = %run_report_path.display(), "Run report saved");
    }

    log_summary(&summary);
    Ok(summary)
}

/// Rejects configurations that cannot run at all.
fn validate(config: &AppConfig) -> Result<(), AppError> {
    if config.legacy.sources.is_empty() {
        return Err(AppError::Config("legacy.sources is empty".to_string()));
    }
    Ok(())
}

async fn open_destination(
    config: &AppConfig,
    summary: &mut RunSummary,
) -> Option<Box<dyn Destination>> {
    if config.migration.dry_run {
        info!("Dry run: rows are staged in memory only");
        return Some(Box::new(MemoryDestination::new()));
    }

    let Some(url) = config.database.url.as_deref() else {
        let err = AppError::Config(
            "database.url is required unless migration.dry_run is set".to_string(),
        );
        error!(code = err.error_code(), error = %err, "Destination not configured");
        summary.record_failure("destination", None, &err);
        return None;
    };
    match nucleus_db::connect(url, &config.database)
        .await
        .context("connecting to destination database")
    {
        Ok(db) => {
            info!("Connected to destination database");
            Some(Box::new(PgDestination::new(db)))
        }
        Err(e) => {
            let err = AppError::Database(format!("{e:#}"));
            error!(code = err.error_code(), error = %err, "Destination connection failed");
            summary.record_failure("destination", None, &err);
            None
        }
    }
}

fn log_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        match &outcome.error {
            Some(e) => warn!(
                source = %outcome.source,
                entity = %outcome.entity,
                table = outcome.matched_table.as_deref().unwrap_or("-"),
                error = %e,
                "Entity failed"
            ),
            None => info!(
                source = %outcome.source,
                entity = %outcome.entity,
                table = outcome.matched_table.as_deref().unwrap_or("-"),
                read = outcome.rows_read,
                migrated = outcome.rows_migrated,
                skipped = outcome.rows_skipped,
                "Entity done"
            ),
        }
    }
    for failure in &summary.failures {
        warn!(
            stage = %failure.stage,
            source = failure.source.as_deref().unwrap_or("-"),
            error = %failure.message,
            "Stage failed"
        );
    }

    info!("{}", "=".repeat(60));
    info!(
        companies = summary.migrated(EntityKind::Company),
        products = summary.migrated(EntityKind::Product),
        invoices = summary.migrated(EntityKind::Invoice),
        success = !summary.has_failures(),
        "Migration completed"
    );
    info!("{}", "=".repeat(60));
}
