//! Invoice upserts.

use nucleus_core::mapping::InvoiceRecord;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::invoices;

/// Invoice writes against a connection or an open transaction.
#[derive(Debug)]
pub struct InvoiceRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> InvoiceRepository<'c, C> {
    /// Creates a repository over a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts an invoice, or updates `total_amount` and `vat_amount` of
    /// the invoice with the same number.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn upsert(&self, company_id: Uuid, record: &InvoiceRecord) -> Result<u64, DbErr> {
        let model = invoices::ActiveModel {
            invoice_number: Set(record.invoice_number.clone()),
            company_id: Set(company_id),
            invoice_date: Set(record.invoice_date),
            status: Set(record.status.clone()),
            subtotal: Set(record.subtotal),
            vat_amount: Set(record.vat_amount),
            total_amount: Set(record.total_amount),
            paid_amount: Set(record.paid_amount),
            discount_percentage: Set(record.discount_percentage),
            discount_amount: Set(record.discount_amount),
            fiscal_verified: Set(record.fiscal_verified),
            ..Default::default()
        };

        invoices::Entity::insert(model)
            .on_conflict(
                OnConflict::column(invoices::Column::InvoiceNumber)
                    .update_columns([invoices::Column::TotalAmount, invoices::Column::VatAmount])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
    }
}
