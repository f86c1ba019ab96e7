//! Common types used across the application.

pub mod entity;
pub mod money;

pub use entity::EntityKind;
pub use money::{GrossSplit, VatRate, round_money};
