//! `SeaORM` entities for the destination tables.
//!
//! The schema is owned by the destination application; these entities only
//! describe the columns the migration writes or reads back.

pub mod companies;
pub mod invoices;
pub mod product_categories;
pub mod products;

pub use companies::Entity as Companies;
pub use invoices::Entity as Invoices;
pub use product_categories::Entity as ProductCategories;
pub use products::Entity as Products;
