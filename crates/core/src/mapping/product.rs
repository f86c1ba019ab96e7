//! Product mapping.

use nucleus_shared::EntityKind;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{AliasTable, EntityMapper, FieldAliases, MappedRow};
use crate::migrate::{MigrationBatch, MigrationContext};
use crate::value::MappingError;

/// Destination fields of `products` fed from legacy columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    /// `code`
    Code,
    /// `name`
    Name,
    /// `description`
    Description,
    /// `unit_of_measure`
    Unit,
    /// `purchase_price`
    PurchasePrice,
    /// `selling_price`
    SellingPrice,
    /// `vat_rate`
    VatRate,
    /// `stock_quantity`
    Stock,
}

static PRODUCT_ALIASES: AliasTable<ProductField> = AliasTable::new(&[
    FieldAliases {
        field: ProductField::Code,
        aliases: &["sifra", "code", "kod"],
    },
    FieldAliases {
        field: ProductField::Name,
        aliases: &["naziv", "name", "ime"],
    },
    FieldAliases {
        field: ProductField::Description,
        aliases: &["opis", "description"],
    },
    FieldAliases {
        field: ProductField::Unit,
        aliases: &["jedinica_mjere", "jm", "unit"],
    },
    FieldAliases {
        field: ProductField::PurchasePrice,
        aliases: &["nabavna_cijena", "nabavna", "purchase_price"],
    },
    FieldAliases {
        field: ProductField::SellingPrice,
        aliases: &["prodajna_cijena", "prodajna", "cijena", "selling_price"],
    },
    FieldAliases {
        field: ProductField::VatRate,
        aliases: &["pdv", "vat", "porez"],
    },
    FieldAliases {
        field: ProductField::Stock,
        aliases: &["stanje", "kolicina", "stock"],
    },
]);

/// A row destined for `products`, keyed by `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    /// Product code, the upsert key; synthesized when missing.
    pub code: String,
    /// Product name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Unit of measure.
    pub unit_of_measure: String,
    /// Purchase price.
    pub purchase_price: Decimal,
    /// Selling price.
    pub selling_price: Decimal,
    /// VAT rate in percent.
    pub vat_rate: Decimal,
    /// Quantity in stock.
    pub stock_quantity: Decimal,
    /// Reorder threshold.
    pub minimum_stock: Decimal,
    /// Service (not stocked) flag.
    pub is_service: bool,
    /// Active flag.
    pub is_active: bool,
}

/// Maps legacy article tables (`Artikli`, `Roba`, ...).
#[derive(Debug)]
pub struct ProductMapper;

impl EntityMapper for ProductMapper {
    type Field = ProductField;
    type Record = ProductRecord;

    const KIND: EntityKind = EntityKind::Product;

    const CANDIDATE_TABLES: &'static [&'static str] =
        &["Artikli", "Artikal", "Products", "Proizvodi", "Roba"];

    fn aliases() -> &'static AliasTable<ProductField> {
        &PRODUCT_ALIASES
    }

    fn build(
        row: &MappedRow<'_, ProductField>,
        ctx: &mut MigrationContext,
    ) -> Result<Option<ProductRecord>, MappingError> {
        // Advance for every row so a synthesized code tracks row position.
        let position_code = ctx.product_codes.next_code();
        let code = row.text(ProductField::Code).unwrap_or(position_code);
        let name = row
            .text(ProductField::Name)
            .unwrap_or_else(|| format!("Product {code}"));

        Ok(Some(ProductRecord {
            name,
            description: row.text(ProductField::Description),
            unit_of_measure: row
                .text(ProductField::Unit)
                .unwrap_or_else(|| ctx.unit.clone()),
            purchase_price: row
                .decimal(ProductField::PurchasePrice)?
                .unwrap_or(Decimal::ZERO),
            selling_price: row
                .decimal(ProductField::SellingPrice)?
                .unwrap_or(Decimal::ZERO),
            vat_rate: row.decimal(ProductField::VatRate)?.unwrap_or(ctx.vat_rate),
            stock_quantity: row.decimal(ProductField::Stock)?.unwrap_or(Decimal::ZERO),
            minimum_stock: Decimal::ZERO,
            is_service: false,
            is_active: true,
            code,
        }))
    }

    fn into_batch(records: Vec<ProductRecord>, ctx: &MigrationContext) -> MigrationBatch {
        MigrationBatch::Products {
            category: ctx.category.clone(),
            rows: records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{context, row_of};
    use crate::value::LegacyValue;
    use rust_decimal_macros::dec;

    #[test]
    fn test_maps_article_columns() {
        let (columns, row) = row_of(&[
            ("SIFRA", LegacyValue::from("P-100")),
            ("NAZIV", LegacyValue::from("Vizit karte")),
            ("JM", LegacyValue::from("kom")),
            ("NABAVNA", LegacyValue::Decimal(dec!(2.50))),
            ("CIJENA", LegacyValue::from("4,90")),
            ("PDV", LegacyValue::Decimal(dec!(7))),
            ("STANJE", LegacyValue::Integer(120)),
        ]);
        let plan = ProductMapper::aliases().plan(&columns);

        let record = ProductMapper::build(&plan.extract(&row), &mut context())
            .unwrap()
            .unwrap();

        assert_eq!(record.code, "P-100");
        assert_eq!(record.name, "Vizit karte");
        assert_eq!(record.unit_of_measure, "kom");
        assert_eq!(record.purchase_price, dec!(2.50));
        assert_eq!(record.selling_price, dec!(4.90));
        assert_eq!(record.vat_rate, dec!(7));
        assert_eq!(record.stock_quantity, dec!(120));
        assert_eq!(record.minimum_stock, Decimal::ZERO);
        assert!(!record.is_service);
        assert!(record.is_active);
    }

    #[test]
    fn test_defaults_for_missing_columns() {
        let (columns, row) = row_of(&[("Opis", LegacyValue::from("Plakat A2"))]);
        let plan = ProductMapper::aliases().plan(&columns);
        let mut ctx = context();

        let record = ProductMapper::build(&plan.extract(&row), &mut ctx)
            .unwrap()
            .unwrap();

        assert_eq!(record.code, "ART0001");
        assert_eq!(record.name, "Product ART0001");
        assert_eq!(record.description.as_deref(), Some("Plakat A2"));
        assert_eq!(record.unit_of_measure, "piece");
        assert_eq!(record.vat_rate, dec!(21));
        assert_eq!(record.selling_price, Decimal::ZERO);
    }

    #[test]
    fn test_null_vat_rate_uses_default() {
        let (columns, row) = row_of(&[("PDV", LegacyValue::Null)]);
        let plan = ProductMapper::aliases().plan(&columns);

        let record = ProductMapper::build(&plan.extract(&row), &mut context())
            .unwrap()
            .unwrap();
        assert_eq!(record.vat_rate, dec!(21));
    }

    #[test]
    fn test_code_sequence_advances_per_row() {
        let mut ctx = context();
        let (columns, with_code) = row_of(&[("Kod", LegacyValue::from("K1"))]);
        let plan = ProductMapper::aliases().plan(&columns);
        let without_code = vec![LegacyValue::Null];

        let first = ProductMapper::build(&plan.extract(&with_code), &mut ctx)
            .unwrap()
            .unwrap();
        let second = ProductMapper::build(&plan.extract(&without_code), &mut ctx)
            .unwrap()
            .unwrap();

        assert_eq!(first.code, "K1");
        assert_eq!(second.code, "ART0002");
    }

    #[test]
    fn test_non_numeric_price_fails() {
        let (columns, row) = row_of(&[("Cijena", LegacyValue::from("po dogovoru"))]);
        let plan = ProductMapper::aliases().plan(&columns);

        let err = ProductMapper::build(&plan.extract(&row), &mut context()).unwrap_err();
        assert!(matches!(err, MappingError::InvalidNumber { ref column, .. } if column == "Cijena"));
    }
}
