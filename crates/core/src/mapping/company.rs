//! Company mapping.

use nucleus_shared::EntityKind;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{AliasTable, EntityMapper, FieldAliases, MappedRow};
use crate::migrate::{MigrationBatch, MigrationContext};
use crate::value::MappingError;

/// Destination fields of `companies` fed from legacy columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyField {
    /// `name`
    Name,
    /// `tax_number` (PIB)
    TaxNumber,
    /// `vat_number`
    VatNumber,
    /// `address`
    Address,
    /// `city`
    City,
    /// `phone`
    Phone,
    /// `email`
    Email,
    /// `bank_account`
    BankAccount,
}

static COMPANY_ALIASES: AliasTable<CompanyField> = AliasTable::new(&[
    FieldAliases {
        field: CompanyField::Name,
        aliases: &["naziv", "ime", "name", "naziv_firme"],
    },
    FieldAliases {
        field: CompanyField::TaxNumber,
        aliases: &["pib", "tax_number", "poreski_broj"],
    },
    FieldAliases {
        field: CompanyField::VatNumber,
        aliases: &["pdv", "vat", "pdv_broj"],
    },
    FieldAliases {
        field: CompanyField::Address,
        aliases: &["adresa", "address", "ulica"],
    },
    FieldAliases {
        field: CompanyField::City,
        aliases: &["grad", "city", "mjesto"],
    },
    FieldAliases {
        field: CompanyField::Phone,
        aliases: &["telefon", "phone", "tel"],
    },
    FieldAliases {
        field: CompanyField::Email,
        aliases: &["email", "e-mail", "mail"],
    },
    FieldAliases {
        field: CompanyField::BankAccount,
        aliases: &["ziro_racun", "racun", "bank_account"],
    },
]);

/// A row destined for `companies`, keyed by `tax_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRecord {
    /// Company name; never empty.
    pub name: String,
    /// Tax identification number, the upsert key.
    pub tax_number: Option<String>,
    /// VAT registration number.
    pub vat_number: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Bank account number.
    pub bank_account: Option<String>,
    /// Country.
    pub country: String,
    /// Payment terms in days.
    pub payment_terms: i32,
    /// Credit limit.
    pub credit_limit: Decimal,
    /// Active flag.
    pub is_active: bool,
}

/// Maps legacy company tables (`Firme`, `Klijenti`, ...).
#[derive(Debug)]
pub struct CompanyMapper;

impl EntityMapper for CompanyMapper {
    type Field = CompanyField;
    type Record = CompanyRecord;

    const KIND: EntityKind = EntityKind::Company;

    const CANDIDATE_TABLES: &'static [&'static str] =
        &["Firme", "Firma", "Companies", "Kompanije", "Klijenti"];

    fn aliases() -> &'static AliasTable<CompanyField> {
        &COMPANY_ALIASES
    }

    fn build(
        row: &MappedRow<'_, CompanyField>,
        ctx: &mut MigrationContext,
    ) -> Result<Option<CompanyRecord>, MappingError> {
        let Some(name) = row.text(CompanyField::Name) else {
            return Ok(None);
        };

        Ok(Some(CompanyRecord {
            name,
            tax_number: row.text(CompanyField::TaxNumber),
            vat_number: row.text(CompanyField::VatNumber),
            address: row.text(CompanyField::Address),
            city: row.text(CompanyField::City),
            phone: row.text(CompanyField::Phone),
            email: row.text(CompanyField::Email),
            bank_account: row.text(CompanyField::BankAccount),
            country: ctx.country.clone(),
            payment_terms: ctx.payment_terms,
            credit_limit: Decimal::ZERO,
            is_active: true,
        }))
    }

    fn into_batch(records: Vec<CompanyRecord>, _ctx: &MigrationContext) -> MigrationBatch {
        MigrationBatch::Companies(records)
    }
}
