//! Heuristic mapping of legacy columns onto destination fields.
//!
//! Each entity declares an [`AliasTable`]: for every destination field, the
//! legacy column names (lowercase) that feed it. A table's columns are
//! resolved once into a [`ColumnPlan`], which then extracts a [`MappedRow`]
//! from every fetched row.

pub mod company;
pub mod invoice;
pub mod product;

use std::collections::HashMap;
use std::hash::Hash;

use nucleus_shared::EntityKind;

use crate::migrate::{MigrationBatch, MigrationContext};
use crate::value::{LegacyValue, MappingError};

pub use company::{CompanyField, CompanyMapper, CompanyRecord};
pub use invoice::{InvoiceField, InvoiceMapper, InvoiceRecord};
pub use product::{ProductField, ProductMapper, ProductRecord};

/// The accepted legacy column names for one destination field.
#[derive(Debug)]
pub struct FieldAliases<F: 'static> {
    /// Destination field.
    pub field: F,
    /// Lowercase legacy column names.
    pub aliases: &'static [&'static str],
}

/// Declarative `{field -> aliases}` table for one entity.
///
/// Groups are searched in order and the first group containing a column
/// wins; overlapping aliases are not reported.
#[derive(Debug)]
pub struct AliasTable<F: 'static> {
    groups: &'static [FieldAliases<F>],
}

impl<F: Copy + Eq + Hash + 'static> AliasTable<F> {
    /// Creates a table from alias groups.
    #[must_use]
    pub const fn new(groups: &'static [FieldAliases<F>]) -> Self {
        Self { groups }
    }

    /// Resolves a legacy column name, case-insensitively.
    #[must_use]
    pub fn resolve(&self, column: &str) -> Option<F> {
        let needle = column.trim().to_lowercase();
        self.groups
            .iter()
            .find(|group| group.aliases.iter().any(|alias| *alias == needle))
            .map(|group| group.field)
    }

    /// Resolves every column of a table once.
    #[must_use]
    pub fn plan(&self, columns: &[String]) -> ColumnPlan<F> {
        ColumnPlan {
            slots: columns
                .iter()
                .enumerate()
                .filter_map(|(idx, name)| {
                    self.resolve(name).map(|field| PlanSlot {
                        index: idx,
                        column: name.clone(),
                        field,
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct PlanSlot<F> {
    index: usize,
    column: String,
    field: F,
}

/// Positions of recognized columns in a fetched table.
///
/// Unrecognized columns are simply absent from the plan.
#[derive(Debug, Clone)]
pub struct ColumnPlan<F> {
    slots: Vec<PlanSlot<F>>,
}

impl<F: Copy + Eq + Hash> ColumnPlan<F> {
    /// Names of the columns that will be used, with the field they feed.
    pub fn recognized(&self) -> impl Iterator<Item = (&str, F)> {
        self.slots.iter().map(|slot| (slot.column.as_str(), slot.field))
    }

    /// Picks the recognized values out of one row.
    ///
    /// When two columns feed the same field, the later column wins.
    #[must_use]
    pub fn extract<'r>(&'r self, row: &'r [LegacyValue]) -> MappedRow<'r, F> {
        let mut values = HashMap::with_capacity(self.slots.len());
        for slot in &self.slots {
            if let Some(value) = row.get(slot.index) {
                values.insert(
                    slot.field,
                    MappedValue {
                        column: &slot.column,
                        value,
                    },
                );
            }
        }
        MappedRow { values }
    }
}

/// A recognized cell together with the legacy column it came from.
#[derive(Debug, Clone)]
pub struct MappedValue<'r> {
    /// Legacy column name, used in error messages.
    pub column: &'r str,
    /// Cell value.
    pub value: &'r LegacyValue,
}

/// The recognized cells of one legacy row, keyed by destination field.
#[derive(Debug, Clone)]
pub struct MappedRow<'r, F> {
    values: HashMap<F, MappedValue<'r>>,
}

impl<F: Copy + Eq + Hash> MappedRow<'_, F> {
    /// Returns true when some column fed this field, even with NULL.
    #[must_use]
    pub fn has(&self, field: F) -> bool {
        self.values.contains_key(&field)
    }

    /// Text value of a field.
    #[must_use]
    pub fn text(&self, field: F) -> Option<String> {
        self.values.get(&field).and_then(|v| v.value.to_text())
    }

    /// Decimal value of a field; `Ok(None)` when absent or NULL.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::InvalidNumber` when the cell is not numeric.
    pub fn decimal(&self, field: F) -> Result<Option<rust_decimal::Decimal>, MappingError> {
        match self.values.get(&field) {
            Some(v) => v.value.to_decimal(v.column),
            None => Ok(None),
        }
    }

    /// Date value of a field; `None` when absent, NULL, or unreadable.
    #[must_use]
    pub fn date(&self, field: F) -> Option<chrono::NaiveDate> {
        self.values.get(&field).and_then(|v| v.value.to_date())
    }
}

/// Per-entity mapping rules.
pub trait EntityMapper {
    /// Destination field enumeration.
    type Field: Copy + Eq + Hash + std::fmt::Debug + 'static;
    /// Destination row.
    type Record;

    /// Entity produced by this mapper.
    const KIND: EntityKind;

    /// Legacy table names to probe, in priority order.
    const CANDIDATE_TABLES: &'static [&'static str];

    /// Column aliases.
    fn aliases() -> &'static AliasTable<Self::Field>;

    /// Builds a destination row, or `None` when the row must be skipped.
    ///
    /// Called once per fetched row, in fetch order.
    ///
    /// # Errors
    ///
    /// Returns an error when a value cannot be coerced.
    fn build(
        row: &MappedRow<'_, Self::Field>,
        ctx: &mut MigrationContext,
    ) -> Result<Option<Self::Record>, MappingError>;

    /// Wraps mapped rows for the destination.
    fn into_batch(records: Vec<Self::Record>, ctx: &MigrationContext) -> MigrationBatch;
}
