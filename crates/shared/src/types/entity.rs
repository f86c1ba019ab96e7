//! Destination entity kinds.

use serde::{Deserialize, Serialize};

/// The destination entities the migration knows how to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Rows of the `companies` table.
    #[serde(alias = "companies")]
    Company,
    /// Rows of the `products` table.
    #[serde(alias = "products")]
    Product,
    /// Rows of the `invoices` table.
    #[serde(alias = "invoices")]
    Invoice,
}

impl EntityKind {
    /// All kinds, in migration order.
    pub const ALL: [Self; 3] = [Self::Company, Self::Product, Self::Invoice];

    /// Destination table name.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Product => "products",
            Self::Invoice => "invoices",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Company => write!(f, "company"),
            Self::Product => write!(f, "product"),
            Self::Invoice => write!(f, "invoice"),
        }
    }
}
