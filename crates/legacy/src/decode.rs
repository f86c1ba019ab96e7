//! Conversion of ODBC text buffers into [`LegacyValue`]s.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use nucleus_core::LegacyValue;
use odbc_api::DataType;
use rust_decimal::Decimal;

/// Decodes one cell fetched as text according to its column's SQL type.
///
/// `None` is SQL NULL. Text columns keep their raw value; trimming happens
/// later when a mapper coerces it.
///
/// # Errors
///
/// Returns a message when the driver text does not match the column type.
pub fn decode_cell(data_type: DataType, text: Option<&str>) -> Result<LegacyValue, String> {
    let Some(text) = text else {
        return Ok(LegacyValue::Null);
    };

    match data_type {
        DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => text
            .trim()
            .parse::<i64>()
            .map(LegacyValue::Integer)
            .map_err(|e| format!("invalid integer {text:?}: {e}")),
        DataType::Decimal { .. }
        | DataType::Numeric { .. }
        | DataType::Float { .. }
        | DataType::Real
        | DataType::Double => parse_decimal(text.trim()).map(LegacyValue::Decimal),
        DataType::Bit => match text.trim() {
            "1" => Ok(LegacyValue::Bool(true)),
            "0" => Ok(LegacyValue::Bool(false)),
            other => Err(format!("invalid bit {other:?}")),
        },
        DataType::Date => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(LegacyValue::Date)
            .map_err(|e| format!("invalid date {text:?}: {e}")),
        DataType::Timestamp { .. } => parse_timestamp(text.trim()),
        _ => Ok(LegacyValue::Text(text.to_string())),
    }
}

/// Decodes a UTF-16 buffer as returned by wide ODBC reads.
pub(crate) fn text_from_wide(buf: &[u16]) -> String {
    String::from_utf16_lossy(buf)
}

fn parse_decimal(text: &str) -> Result<Decimal, String> {
    // Single/Double columns may come back in exponent notation.
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| format!("invalid number {text:?}: {e}"))
}

fn parse_timestamp(text: &str) -> Result<LegacyValue, String> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .map(LegacyValue::DateTime)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d").map(LegacyValue::Date))
        .map_err(|e| format!("invalid timestamp {text:?}: {e}"))
}
