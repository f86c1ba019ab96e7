//! Invoice mapping.

use chrono::NaiveDate;
use nucleus_shared::EntityKind;
use nucleus_shared::types::VatRate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{AliasTable, EntityMapper, FieldAliases, MappedRow};
use crate::migrate::{MigrationBatch, MigrationContext};
use crate::value::MappingError;

/// Destination fields of `invoices` fed from legacy columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceField {
    /// `invoice_number`
    Number,
    /// `invoice_date`
    Date,
    /// `total_amount`
    Total,
    /// `vat_amount`
    VatAmount,
    /// `subtotal`
    Subtotal,
}

static INVOICE_ALIASES: AliasTable<InvoiceField> = AliasTable::new(&[
    FieldAliases {
        field: InvoiceField::Number,
        aliases: &["broj", "broj_fakture", "invoice_number"],
    },
    FieldAliases {
        field: InvoiceField::Date,
        aliases: &["datum", "date", "invoice_date"],
    },
    FieldAliases {
        field: InvoiceField::Total,
        aliases: &["iznos", "ukupno", "total", "total_amount"],
    },
    FieldAliases {
        field: InvoiceField::VatAmount,
        aliases: &["pdv", "vat", "porez"],
    },
    FieldAliases {
        field: InvoiceField::Subtotal,
        aliases: &["osnovica", "subtotal", "neto"],
    },
]);

/// Status given to every migrated invoice.
pub const MIGRATED_INVOICE_STATUS: &str = "issued";

/// A row destined for `invoices`, keyed by `invoice_number`.
///
/// The company is resolved by the destination: the first existing company,
/// or the placeholder when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRecord {
    /// Invoice number, the upsert key; synthesized when missing.
    pub invoice_number: String,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Amount before tax.
    pub subtotal: Decimal,
    /// Tax amount.
    pub vat_amount: Decimal,
    /// Gross amount.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// Discount in percent.
    pub discount_percentage: Decimal,
    /// Discount amount.
    pub discount_amount: Decimal,
    /// Lifecycle status.
    pub status: String,
    /// Whether the fiscal service confirmed the invoice.
    pub fiscal_verified: bool,
}

/// Maps legacy invoice tables (`Fakture`, `Racuni`, ...).
#[derive(Debug)]
pub struct InvoiceMapper;

impl EntityMapper for InvoiceMapper {
    type Field = InvoiceField;
    type Record = InvoiceRecord;

    const KIND: EntityKind = EntityKind::Invoice;

    const CANDIDATE_TABLES: &'static [&'static str] =
        &["Fakture", "Faktura", "Invoices", "Racuni", "Racun"];

    fn aliases() -> &'static AliasTable<InvoiceField> {
        &INVOICE_ALIASES
    }

    fn build(
        row: &MappedRow<'_, InvoiceField>,
        ctx: &mut MigrationContext,
    ) -> Result<Option<InvoiceRecord>, MappingError> {
        let position_number = ctx.invoice_numbers.next_code();
        let invoice_number = row.text(InvoiceField::Number).unwrap_or(position_number);
        let invoice_date = row.date(InvoiceField::Date).unwrap_or(ctx.today);

        // A column that is present but NULL counts as zero; an absent column
        // is derived from the others.
        let total = present_amount(row, InvoiceField::Total)?;
        let subtotal = present_amount(row, InvoiceField::Subtotal)?;
        let vat = present_amount(row, InvoiceField::VatAmount)?;
        let (subtotal, vat_amount, total_amount) = complete_amounts(subtotal, vat, total);

        Ok(Some(InvoiceRecord {
            invoice_number,
            invoice_date,
            subtotal,
            vat_amount,
            total_amount,
            paid_amount: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            status: MIGRATED_INVOICE_STATUS.to_string(),
            fiscal_verified: false,
        }))
    }

    fn into_batch(records: Vec<InvoiceRecord>, ctx: &MigrationContext) -> MigrationBatch {
        MigrationBatch::Invoices {
            placeholder_company: ctx.placeholder_company.clone(),
            country: ctx.country.clone(),
            rows: records,
        }
    }
}

fn present_amount(
    row: &MappedRow<'_, InvoiceField>,
    field: InvoiceField,
) -> Result<Option<Decimal>, MappingError> {
    if row.has(field) {
        Ok(Some(row.decimal(field)?.unwrap_or(Decimal::ZERO)))
    } else {
        Ok(None)
    }
}

/// Fills in whichever of subtotal, VAT, and total the legacy table lacked.
///
/// Totals without a breakdown are split at the standard 21% rate.
#[must_use]
pub fn complete_amounts(
    subtotal: Option<Decimal>,
    vat: Option<Decimal>,
    total: Option<Decimal>,
) -> (Decimal, Decimal, Decimal) {
    match (subtotal, vat, total) {
        (None, _, Some(total)) => {
            let split = VatRate::standard().split_gross(total);
            (split.net, vat.unwrap_or(split.vat), total)
        }
        (Some(subtotal), None, Some(total)) => (subtotal, total - subtotal, total),
        (subtotal, vat, None) => {
            let subtotal = subtotal.unwrap_or(Decimal::ZERO);
            let vat = vat.unwrap_or(Decimal::ZERO);
            (subtotal, vat, subtotal + vat)
        }
        (Some(subtotal), Some(vat), Some(total)) => (subtotal, vat, total),
    }
}
