//! Company upserts and the placeholder company used by invoices.

use nucleus_core::mapping::CompanyRecord;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set, Statement};
use uuid::Uuid;

use crate::entities::companies;

/// Returns the id of the oldest company, creating the placeholder when the
/// table is empty. One statement, so a concurrent insert cannot slip between
/// the lookup and the insert.
const GET_OR_CREATE_INVOICE_COMPANY: &str = r"
WITH existing AS (
    SELECT id FROM companies ORDER BY created_at, id LIMIT 1
), inserted AS (
    INSERT INTO companies (name, country, payment_terms, credit_limit, is_active)
    SELECT $1, $2, 0, 0, true
    WHERE NOT EXISTS (SELECT 1 FROM existing)
    RETURNING id
)
SELECT id FROM existing
UNION ALL
SELECT id FROM inserted
";

/// Upsert for a company without a tax number, keyed by name among the
/// companies that have none. Updates the same columns as the tax number
/// conflict.
const UPSERT_BY_NAME: &str = r"
WITH updated AS (
    UPDATE companies SET name = $1, address = $2, city = $3
    WHERE id = (
        SELECT id FROM companies
        WHERE tax_number IS NULL AND name = $1
        ORDER BY created_at, id
        LIMIT 1
    )
    RETURNING id
), inserted AS (
    INSERT INTO companies (
        name, address, city, vat_number, country, phone, email, bank_account,
        is_active, credit_limit, payment_terms
    )
    SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11
    WHERE NOT EXISTS (SELECT 1 FROM updated)
    RETURNING id
)
SELECT (SELECT count(*) FROM updated) + (SELECT count(*) FROM inserted) AS written
";

/// Company writes against a connection or an open transaction.
#[derive(Debug)]
pub struct CompanyRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CompanyRepository<'c, C> {
    /// Creates a repository over a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts a company, or updates `name`, `address` and `city` of the
    /// company with the same tax number. Without a tax number the match is
    /// on name among companies that have none. Returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn upsert(&self, record: &CompanyRecord) -> Result<u64, DbErr> {
        if record.tax_number.is_none() {
            return self.upsert_by_name(record).await;
        }

        let model = companies::ActiveModel {
            name: Set(record.name.clone()),
            tax_number: Set(record.tax_number.clone()),
            vat_number: Set(record.vat_number.clone()),
            address: Set(record.address.clone()),
            city: Set(record.city.clone()),
            country: Set(Some(record.country.clone())),
            phone: Set(record.phone.clone()),
            email: Set(record.email.clone()),
            bank_account: Set(record.bank_account.clone()),
            is_active: Set(record.is_active),
            credit_limit: Set(record.credit_limit),
            payment_terms: Set(record.payment_terms),
            ..Default::default()
        };

        companies::Entity::insert(model)
            .on_conflict(
                OnConflict::column(companies::Column::TaxNumber)
                    .update_columns([
                        companies::Column::Name,
                        companies::Column::Address,
                        companies::Column::City,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
    }

    async fn upsert_by_name(&self, record: &CompanyRecord) -> Result<u64, DbErr> {
        let statement = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            UPSERT_BY_NAME,
            [
                record.name.clone().into(),
                record.address.clone().into(),
                record.city.clone().into(),
                record.vat_number.clone().into(),
                record.country.clone().into(),
                record.phone.clone().into(),
                record.email.clone().into(),
                record.bank_account.clone().into(),
                record.is_active.into(),
                record.credit_limit.into(),
                record.payment_terms.into(),
            ],
        );

        let written = match self.conn.query_one(statement).await? {
            Some(row) => row.try_get::<i64>("", "written")?,
            None => 0,
        };
        Ok(u64::try_from(written).unwrap_or_default())
    }

    /// Returns the id of the company invoices attach to: the oldest company,
    /// or the placeholder `name` created when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn get_or_create_invoice_company(
        &self,
        name: &str,
        country: &str,
    ) -> Result<Option<Uuid>, DbErr> {
        let statement = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            GET_OR_CREATE_INVOICE_COMPANY,
            [name.into(), country.into()],
        );

        match self.conn.query_one(statement).await? {
            Some(row) => row.try_get::<Uuid>("", "id").map(Some),
            None => Ok(None),
        }
    }
}
