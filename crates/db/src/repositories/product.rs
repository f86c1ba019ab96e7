//! Product upserts.

use nucleus_core::mapping::ProductRecord;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::products;

/// Product writes against a connection or an open transaction.
#[derive(Debug)]
pub struct ProductRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ProductRepository<'c, C> {
    /// Creates a repository over a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts a product, or updates `name`, `selling_price` and
    /// `stock_quantity` of the product with the same code.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn upsert(&self, category_id: Uuid, record: &ProductRecord) -> Result<u64, DbErr> {
        let model = products::ActiveModel {
            category_id: Set(Some(category_id)),
            code: Set(record.code.clone()),
            name: Set(record.name.clone()),
            description: Set(record.description.clone()),
            unit_of_measure: Set(record.unit_of_measure.clone()),
            purchase_price: Set(record.purchase_price),
            selling_price: Set(record.selling_price),
            vat_rate: Set(record.vat_rate),
            stock_quantity: Set(record.stock_quantity),
            minimum_stock: Set(record.minimum_stock),
            is_service: Set(record.is_service),
            is_active: Set(record.is_active),
            ..Default::default()
        };

        products::Entity::insert(model)
            .on_conflict(
                OnConflict::column(products::Column::Code)
                    .update_columns([
                        products::Column::Name,
                        products::Column::SellingPrice,
                        products::Column::StockQuantity,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
    }
}
