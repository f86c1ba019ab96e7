//! End-to-end migration tests against in-memory sources and destinations.

use nucleus_shared::{AppConfig, EntityKind, LegacySourceConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixture::{FailingDestination, MemoryProvider, MemorySource, context};
use crate::mapping::{CompanyMapper, InvoiceMapper, ProductMapper};
use crate::migrate::{MemoryDestination, RunSummary, migrate_entity};
use crate::pipeline::Pipeline;
use crate::value::LegacyValue;

fn text(s: &str) -> LegacyValue {
    LegacyValue::from(s)
}

fn firms() -> MemorySource {
    MemorySource::new().with_table(
        "FIRME",
        &["ID", "NAZIV", "PIB", "GRAD"],
        vec![
            vec![LegacyValue::Integer(1), text("Brain d.o.o."), text("02600123"), text("Podgorica")],
            vec![LegacyValue::Integer(2), text("Harmon doo"), text("02600456"), text("Bar")],
            vec![LegacyValue::Integer(3), LegacyValue::Null, text("02600789"), text("Kotor")],
        ],
    )
}

fn config_with(sources: &[(&str, &[EntityKind])]) -> AppConfig {
    let mut config = AppConfig::default();
    config.legacy.sources = sources
        .iter()
        .map(|(name, entities)| LegacySourceConfig {
            name: (*name).to_string(),
            path: format!("/legacy/{name}.mdb").into(),
            entities: entities.to_vec(),
        })
        .collect();
    config
}

#[tokio::test]
async fn test_named_rows_migrate_exactly_once() {
    let destination = MemoryDestination::new();
    let mut ctx = context();

    let outcome = migrate_entity::<CompanyMapper>("main", &firms(), &destination, &mut ctx).await;

    assert_eq!(outcome.matched_table.as_deref(), Some("Firme"));
    assert_eq!(outcome.rows_read, 3);
    assert_eq!(outcome.rows_migrated, 2);
    assert_eq!(outcome.rows_skipped, 1);
    assert!(outcome.error.is_none());

    let companies = destination.companies();
    let names: Vec<_> = companies.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Brain d.o.o.", "Harmon doo"]);
}

#[tokio::test]
async fn test_rerun_does_not_duplicate() {
    let source = firms().with_table(
        "ARTIKLI",
        &["NAZIV", "CIJENA"],
        vec![vec![text("Flajer"), text("0,15")], vec![text("Plakat"), text("3")]],
    );
    let destination = MemoryDestination::new();

    for _ in 0..2 {
        let mut ctx = context();
        migrate_entity::<CompanyMapper>("main", &source, &destination, &mut ctx).await;
        migrate_entity::<ProductMapper>("main", &source, &destination, &mut ctx).await;
    }

    assert_eq!(destination.companies().len(), 2);
    let codes: Vec<_> = destination.products().into_iter().map(|p| p.code).collect();
    assert_eq!(codes, ["ART0001", "ART0002"]);
}

#[tokio::test]
async fn test_first_matching_candidate_wins() {
    let source = MemorySource::new()
        .with_table("Firme", &["Naziv"], vec![vec![text("Only one")]])
        .with_table(
            "Firma",
            &["Naziv"],
            (0..5).map(|i| vec![text(&format!("Other {i}"))]).collect(),
        );
    let destination = MemoryDestination::new();

    let outcome =
        migrate_entity::<CompanyMapper>("main", &source, &destination, &mut context()).await;

    assert_eq!(outcome.matched_table.as_deref(), Some("Firme"));
    assert_eq!(outcome.rows_migrated, 1);
    assert_eq!(destination.companies().len(), 1);
}

#[tokio::test]
async fn test_empty_candidate_is_passed_over() {
    let source = MemorySource::new()
        .with_table("Firme", &["Naziv"], Vec::new())
        .with_table("Klijenti", &["Ime"], vec![vec![text("A")], vec![text("B")]]);
    let destination = MemoryDestination::new();

    let outcome =
        migrate_entity::<CompanyMapper>("main", &source, &destination, &mut context()).await;

    assert_eq!(outcome.matched_table.as_deref(), Some("Klijenti"));
    assert_eq!(outcome.rows_migrated, 2);
}

#[tokio::test]
async fn test_no_candidate_is_a_silent_noop() {
    let source = MemorySource::new().with_table("NALOG", &["BROJ"], vec![vec![text("1")]]);
    let destination = MemoryDestination::new();

    let outcome =
        migrate_entity::<InvoiceMapper>("main", &source, &destination, &mut context()).await;

    assert_eq!(outcome.matched_table, None);
    assert_eq!(outcome.rows_read, 0);
    assert!(!outcome.is_failure());
    assert!(destination.invoices().is_empty());
}

#[tokio::test]
async fn test_total_without_breakdown_uses_21_percent() {
    let source = MemorySource::new().with_table(
        "Fakture",
        &["BROJ", "IZNOS"],
        vec![vec![text("F-1"), LegacyValue::Decimal(dec!(121.00))]],
    );
    let destination = MemoryDestination::new();

    migrate_entity::<InvoiceMapper>("main", &source, &destination, &mut context()).await;

    let invoice = &destination.invoices()[0];
    let tolerance = dec!(0.01);
    assert!((invoice.subtotal - dec!(100.00)).abs() < tolerance);
    assert!((invoice.vat_amount - dec!(21.00)).abs() < tolerance);
    assert_eq!(invoice.total_amount, dec!(121.00));
}

#[tokio::test]
async fn test_invoices_attach_to_one_placeholder_company() {
    let source = MemorySource::new().with_table(
        "Racuni",
        &["Ukupno"],
        vec![vec![LegacyValue::Integer(10)], vec![LegacyValue::Integer(20)]],
    );
    let destination = MemoryDestination::new();

    for _ in 0..2 {
        migrate_entity::<InvoiceMapper>("main", &source, &destination, &mut context()).await;
    }

    let companies = destination.companies();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].name, "Unknown client");
    assert_eq!(destination.invoice_company().as_deref(), Some("Unknown client"));
    assert_eq!(destination.invoices().len(), 2);
}

#[tokio::test]
async fn test_invoices_use_existing_company() {
    let source = firms().with_table(
        "Racuni",
        &["Ukupno"],
        vec![vec![LegacyValue::Integer(10)]],
    );
    let destination = MemoryDestination::new();
    let mut ctx = context();

    migrate_entity::<CompanyMapper>("main", &source, &destination, &mut ctx).await;
    migrate_entity::<InvoiceMapper>("main", &source, &destination, &mut ctx).await;

    let names: Vec<_> = destination.companies().into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["Brain d.o.o.", "Harmon doo"]);
    assert_eq!(destination.invoice_company().as_deref(), Some("Brain d.o.o."));
    assert_eq!(destination.invoices().len(), 1);
}

#[tokio::test]
async fn test_rerun_without_tax_numbers_does_not_duplicate() {
    let source = MemorySource::new().with_table(
        "Firme",
        &["NAZIV", "GRAD"],
        vec![
            vec![text("Opšte usluge"), text("Nikšić")],
            vec![text("Brain d.o.o."), LegacyValue::Null],
        ],
    );
    let moved = MemorySource::new().with_table(
        "Firme",
        &["NAZIV", "GRAD"],
        vec![vec![text("Opšte usluge"), text("Podgorica")]],
    );
    let destination = MemoryDestination::new();

    for run in [&source, &source, &moved] {
        migrate_entity::<CompanyMapper>("main", run, &destination, &mut context()).await;
    }

    let companies = destination.companies();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0].name, "Opšte usluge");
    assert_eq!(companies[0].city.as_deref(), Some("Podgorica"));
    assert!(companies.iter().all(|c| c.tax_number.is_none()));
}

#[tokio::test]
async fn test_company_without_name_column_is_excluded() {
    let source = MemorySource::new().with_table(
        "Firme",
        &["PIB", "ADRESA"],
        vec![vec![text("123"), text("Ulica 1")]],
    );
    let destination = MemoryDestination::new();

    let outcome =
        migrate_entity::<CompanyMapper>("main", &source, &destination, &mut context()).await;

    assert_eq!(outcome.rows_skipped, 1);
    assert_eq!(outcome.rows_migrated, 0);
    assert!(destination.companies().is_empty());
}

#[tokio::test]
async fn test_synthesized_product_codes_are_unique() {
    let source = MemorySource::new().with_table(
        "Artikli",
        &["NAZIV"],
        (0..12).map(|i| vec![text(&format!("Artikal {i}"))]).collect(),
    );
    let destination = MemoryDestination::new();

    let outcome =
        migrate_entity::<ProductMapper>("main", &source, &destination, &mut context()).await;

    assert_eq!(outcome.rows_migrated, 12);
    let products = destination.products();
    assert_eq!(products.len(), 12);
    assert!(products.iter().all(|p| p.code.starts_with("ART") && p.code.len() == 7));
    assert_eq!(products[0].code, "ART0001");
    assert_eq!(products[11].code, "ART0012");
    assert_eq!(destination.categories(), ["General"]);
}

#[tokio::test]
async fn test_bad_row_voids_the_whole_batch() {
    let source = MemorySource::new().with_table(
        "Artikli",
        &["SIFRA", "CIJENA"],
        vec![
            vec![text("A1"), text("10")],
            vec![text("A2"), text("po dogovoru")],
            vec![text("A3"), text("12")],
        ],
    );
    let destination = MemoryDestination::new();

    let outcome =
        migrate_entity::<ProductMapper>("main", &source, &destination, &mut context()).await;

    assert!(outcome.is_failure());
    assert_eq!(outcome.rows_migrated, 0);
    assert!(outcome.error.unwrap().contains("CIJENA"));
    assert!(destination.products().is_empty());
}

#[tokio::test]
async fn test_destination_failure_is_reported() {
    let mut ctx = context();

    let outcome = migrate_entity::<CompanyMapper>("main", &firms(), &FailingDestination, &mut ctx).await;

    assert!(outcome.is_failure());
    assert_eq!(outcome.rows_read, 3);
    assert_eq!(outcome.rows_migrated, 0);
}

#[tokio::test]
async fn test_pipeline_continues_codes_across_sources() {
    let config = config_with(&[
        ("main", &[EntityKind::Product]),
        ("harmon", &[EntityKind::Product]),
    ]);
    let provider = MemoryProvider::new()
        .with_source(
            "main",
            MemorySource::new().with_table("Artikli", &["NAZIV"], vec![vec![text("A")], vec![text("B")]]),
        )
        .with_source(
            "harmon",
            MemorySource::new().with_table("Roba", &["NAZIV"], vec![vec![text("C")]]),
        );
    let destination = MemoryDestination::new();
    let mut summary = RunSummary::start(true);

    Pipeline::new(&config)
        .migrate(&provider, &destination, &mut context(), &mut summary)
        .await;

    let codes: Vec<_> = destination.products().into_iter().map(|p| p.code).collect();
    assert_eq!(codes, ["ART0001", "ART0002", "ART0003"]);
    assert_eq!(summary.migrated(EntityKind::Product), 3);
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn test_pipeline_runs_entities_in_fixed_order() {
    let config = config_with(&[(
        "main",
        &[EntityKind::Invoice, EntityKind::Company, EntityKind::Product],
    )]);
    let provider = MemoryProvider::new().with_source("main", firms());
    let destination = MemoryDestination::new();
    let mut summary = RunSummary::start(true);

    Pipeline::new(&config)
        .migrate(&provider, &destination, &mut context(), &mut summary)
        .await;

    let order: Vec<_> = summary.outcomes.iter().map(|o| o.entity).collect();
    assert_eq!(order, EntityKind::ALL);
    assert_eq!(summary.migrated(EntityKind::Company), 2);
}

#[tokio::test]
async fn test_analysis_survives_destination_failure() {
    let config = config_with(&[
        ("main", &[EntityKind::Company]),
        ("fiscal", &[]),
        ("harmon", &[EntityKind::Company]),
    ]);
    let provider = MemoryProvider::new()
        .with_source("main", firms())
        .with_source("fiscal", MemorySource::new().with_table("LOG", &["ID"], Vec::new()))
        .with_unreachable("harmon");
    let pipeline = Pipeline::new(&config);

    let report = pipeline.analyze(&provider);
    assert_eq!(report.len(), 2);
    assert!(report.source("fiscal").is_some());
    assert!(report.source("harmon").is_none());

    let mut summary = RunSummary::start(false);
    pipeline
        .migrate(&provider, &FailingDestination, &mut context(), &mut summary)
        .await;
    summary.finish();

    assert_eq!(summary.outcomes.len(), 1);
    assert!(summary.outcomes[0].is_failure());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].source.as_deref(), Some("harmon"));
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_source_is_skipped_without_failure() {
    let config = config_with(&[("main", &[EntityKind::Company]), ("harmon", &[EntityKind::Company])]);
    let provider = MemoryProvider::new().with_source("main", firms());
    let destination = MemoryDestination::new();
    let mut summary = RunSummary::start(true);

    Pipeline::new(&config)
        .migrate(&provider, &destination, &mut context(), &mut summary)
        .await;

    assert_eq!(summary.outcomes.len(), 1);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(destination.companies().len(), 2);
    assert!(destination.invoices().is_empty());
    assert_eq!(destination.products().len(), 0);
    assert_eq!(Decimal::ZERO, destination.companies()[0].credit_limit);
}
