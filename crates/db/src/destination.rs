//! PostgreSQL implementation of the migration destination.

use async_trait::async_trait;
use nucleus_core::{Destination, DestinationError, MigrationBatch};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use crate::error::database_error;
use crate::repositories::{
    CategoryRepository, CompanyRepository, InvoiceRepository, ProductRepository,
};

/// Writes entity batches to PostgreSQL, one transaction per batch.
#[derive(Debug, Clone)]
pub struct PgDestination {
    db: DatabaseConnection,
}

impl PgDestination {
    /// Creates a destination over an open connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Destination for PgDestination {
    async fn upsert(&self, batch: MigrationBatch) -> Result<u64, DestinationError> {
        let kind = batch.kind();
        let txn = self.db.begin().await.map_err(database_error)?;

        match write_batch(&txn, batch).await {
            Ok(written) => {
                txn.commit().await.map_err(database_error)?;
                debug!(table = kind.table_name(), rows = written, "Batch committed");
                Ok(written)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(entity = %kind, error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

async fn write_batch(
    txn: &DatabaseTransaction,
    batch: MigrationBatch,
) -> Result<u64, DestinationError> {
    let mut written = 0;

    match batch {
        MigrationBatch::Companies(rows) => {
            let companies = CompanyRepository::new(txn);
            for row in &rows {
                written += companies.upsert(row).await.map_err(database_error)?;
            }
        }
        MigrationBatch::Products { category, rows } => {
            let category_id = CategoryRepository::new(txn)
                .get_or_create(&category)
                .await
                .map_err(database_error)?
                .ok_or_else(|| DestinationError::Unresolved(format!("category {category:?}")))?;

            let products = ProductRepository::new(txn);
            for row in &rows {
                written += products
                    .upsert(category_id, row)
                    .await
                    .map_err(database_error)?;
            }
        }
        MigrationBatch::Invoices {
            placeholder_company,
            country,
            rows,
        } => {
            let company_id = CompanyRepository::new(txn)
                .get_or_create_invoice_company(&placeholder_company, &country)
                .await
                .map_err(database_error)?
                .ok_or_else(|| {
                    DestinationError::Unresolved(format!("company {placeholder_company:?}"))
                })?;

            let invoices = InvoiceRepository::new(txn);
            for row in &rows {
                written += invoices
                    .upsert(company_id, row)
                    .await
                    .map_err(database_error)?;
            }
        }
    }

    Ok(written)
}
