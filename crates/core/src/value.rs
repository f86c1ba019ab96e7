//! Untyped legacy cell values.
//!
//! The legacy schema is only known at runtime, so every cell arrives as a
//! [`LegacyValue`] and is coerced into the destination type when a mapper
//! asks for it.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while coercing a legacy value into a destination type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A numeric destination field received text that is not a number.
    #[error("Column {column} holds a non-numeric value: {value:?}")]
    InvalidNumber {
        /// Legacy column name.
        column: String,
        /// Offending value as text.
        value: String,
    },
}

/// A single cell read from a legacy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LegacyValue {
    /// SQL NULL.
    Null,
    /// Yes/No column.
    Bool(bool),
    /// Integer column (Byte, Integer, Long Integer, Counter).
    Integer(i64),
    /// Currency, Decimal, Single, or Double column.
    Decimal(Decimal),
    /// Text or Memo column.
    Text(String),
    /// Date-only value.
    Date(NaiveDate),
    /// Date/Time column.
    DateTime(NaiveDateTime),
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d.%m.%Y", "%d.%m.%Y.", "%m/%d/%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

impl LegacyValue {
    /// Coerces the value into trimmed, non-empty text.
    ///
    /// NULL and blank strings yield `None`; numbers and dates are rendered.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Decimal(d) => Some(d.normalize().to_string()),
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Coerces the value into a decimal.
    ///
    /// NULL and blank strings yield `Ok(None)` so the caller can apply its
    /// default. Text accepts either `.` or a lone `,` as decimal separator.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::InvalidNumber` for text or dates that are not
    /// numbers.
    pub fn to_decimal(&self, column: &str) -> Result<Option<Decimal>, MappingError> {
        match self {
            Self::Null => Ok(None),
            Self::Bool(b) => Ok(Some(if *b { Decimal::ONE } else { Decimal::ZERO })),
            Self::Integer(i) => Ok(Some(Decimal::from(*i))),
            Self::Decimal(d) => Ok(Some(*d)),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                parse_decimal(trimmed)
                    .map(Some)
                    .ok_or_else(|| invalid_number(column, trimmed))
            }
            Self::Date(_) | Self::DateTime(_) => Err(invalid_number(
                column,
                &self.to_text().unwrap_or_default(),
            )),
        }
    }

    /// Coerces the value into a calendar date.
    ///
    /// Returns `None` when the value is NULL or cannot be read as a date.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            Self::Text(s) => parse_date(s.trim()),
            Self::Null | Self::Bool(_) | Self::Integer(_) | Self::Decimal(_) => None,
        }
    }
}

fn invalid_number(column: &str, value: &str) -> MappingError {
    MappingError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if let Ok(d) = text.parse::<Decimal>() {
        return Some(d);
    }
    // "12,50" from locales with a decimal comma
    if text.matches(',').count() == 1 && !text.contains('.') {
        return text.replace(',', ".").parse::<Decimal>().ok();
    }
    None
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

impl From<&str> for LegacyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for LegacyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for LegacyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<Decimal> for LegacyValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<NaiveDate> for LegacyValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<Self>> From<Option<T>> for LegacyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
