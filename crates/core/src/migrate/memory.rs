//! In-memory destination used for dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{Destination, DestinationError, MigrationBatch};
use crate::mapping::{CompanyRecord, InvoiceRecord, ProductRecord};

/// Stages rows in memory with the same upsert rules as the real tables.
///
/// Companies are keyed by tax number, or by name when they have none.
/// Invoices go to the first staged company; the placeholder company is
/// only created while there is none.
#[derive(Debug, Default)]
pub struct MemoryDestination {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Insertion order.
    companies: Vec<CompanyRecord>,
    company_by_tax: BTreeMap<String, usize>,
    company_by_name: BTreeMap<String, usize>,
    invoice_company: Option<usize>,
    products: BTreeMap<String, ProductRecord>,
    invoices: BTreeMap<String, InvoiceRecord>,
    categories: BTreeSet<String>,
}

impl MemoryDestination {
    /// Creates an empty destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, DestinationError> {
        self.state
            .lock()
            .map_err(|_| DestinationError::Database("memory destination poisoned".into()))
    }

    /// All staged companies, in insertion order.
    #[must_use]
    pub fn companies(&self) -> Vec<CompanyRecord> {
        self.lock()
            .map(|state| state.companies.clone())
            .unwrap_or_default()
    }

    /// Name of the company invoices were last attached to.
    #[must_use]
    pub fn invoice_company(&self) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .invoice_company
                    .and_then(|i| state.companies.get(i))
                    .map(|company| company.name.clone())
            })
    }

    /// All staged products, ordered by code.
    #[must_use]
    pub fn products(&self) -> Vec<ProductRecord> {
        self.lock()
            .map(|state| state.products.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All staged invoices, ordered by number.
    #[must_use]
    pub fn invoices(&self) -> Vec<InvoiceRecord> {
        self.lock()
            .map(|state| state.invoices.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Categories created so far.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.lock()
            .map(|state| state.categories.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl MemoryState {
    fn upsert_company(&mut self, record: CompanyRecord) {
        let existing = match &record.tax_number {
            Some(tax) => self.company_by_tax.get(tax),
            None => self.company_by_name.get(&record.name),
        };
        if let Some(&index) = existing {
            let company = &mut self.companies[index];
            company.name = record.name;
            company.address = record.address;
            company.city = record.city;
            return;
        }

        let index = self.companies.len();
        match &record.tax_number {
            Some(tax) => self.company_by_tax.insert(tax.clone(), index),
            None => self.company_by_name.insert(record.name.clone(), index),
        };
        self.companies.push(record);
    }

    fn upsert_product(&mut self, record: ProductRecord) {
        match self.products.get_mut(&record.code) {
            Some(existing) => {
                existing.name = record.name;
                existing.selling_price = record.selling_price;
                existing.stock_quantity = record.stock_quantity;
            }
            None => {
                self.products.insert(record.code.clone(), record);
            }
        }
    }

    fn upsert_invoice(&mut self, record: InvoiceRecord) {
        match self.invoices.get_mut(&record.invoice_number) {
            Some(existing) => {
                existing.total_amount = record.total_amount;
                existing.vat_amount = record.vat_amount;
            }
            None => {
                self.invoices.insert(record.invoice_number.clone(), record);
            }
        }
    }

    /// Index of the first company, staging the placeholder when empty.
    fn resolve_invoice_company(&mut self, placeholder: &str, country: &str) -> usize {
        if self.companies.is_empty() {
            self.upsert_company(CompanyRecord {
                name: placeholder.to_string(),
                tax_number: None,
                vat_number: None,
                address: None,
                city: None,
                phone: None,
                email: None,
                bank_account: None,
                country: country.to_string(),
                payment_terms: 0,
                credit_limit: Decimal::ZERO,
                is_active: true,
            });
        }
        0
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn upsert(&self, batch: MigrationBatch) -> Result<u64, DestinationError> {
        let mut state = self.lock()?;
        let written = batch.len() as u64;

        match batch {
            MigrationBatch::Companies(rows) => {
                for row in rows {
                    state.upsert_company(row);
                }
            }
            MigrationBatch::Products { category, rows } => {
                state.categories.insert(category);
                for row in rows {
                    state.upsert_product(row);
                }
            }
            MigrationBatch::Invoices {
                placeholder_company,
                country,
                rows,
            } => {
                let company = state.resolve_invoice_company(&placeholder_company, &country);
                state.invoice_company = Some(company);
                for row in rows {
                    state.upsert_invoice(row);
                }
            }
        }

        Ok(written)
    }
}
