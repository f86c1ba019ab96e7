//! Run-wide state shared by the entity migrators.

use chrono::NaiveDate;
use nucleus_shared::MigrationConfig;
use rust_decimal::Decimal;

use crate::sequence::CodeSequence;

/// Defaults for incomplete rows plus the run-scoped code sequences.
#[derive(Debug, Clone)]
pub struct MigrationContext {
    /// Date used for invoices without a readable date.
    pub today: NaiveDate,
    /// Country assigned to companies.
    pub country: String,
    /// Payment terms (days) assigned to companies.
    pub payment_terms: i32,
    /// VAT rate for products without one.
    pub vat_rate: Decimal,
    /// Unit of measure for products without one.
    pub unit: String,
    /// Category every product is filed under.
    pub category: String,
    /// Company created for invoices when the destination has none.
    pub placeholder_company: String,
    /// Product code sequence (`ART0001`).
    pub product_codes: CodeSequence,
    /// Invoice number sequence (`INV000001`).
    pub invoice_numbers: CodeSequence,
}

impl MigrationContext {
    /// Builds the context from configuration.
    #[must_use]
    pub fn new(config: &MigrationConfig, today: NaiveDate) -> Self {
        Self {
            today,
            country: config.default_country.clone(),
            payment_terms: config.default_payment_terms,
            vat_rate: config.default_vat_rate,
            unit: config.default_unit.clone(),
            category: config.default_category.clone(),
            placeholder_company: config.placeholder_company.clone(),
            product_codes: CodeSequence::products(),
            invoice_numbers: CodeSequence::invoices(),
        }
    }
}
