//! Coercions for the loosely typed store columns. Stored data mixes
//! ISO and localized dates, decimal commas, currency prefixes, and a
//! zoo of boolean spellings; everything here is tolerant and total.

use chrono::{DateTime, NaiveDate, NaiveTime};

/// Accepts ISO (`2025-07-05`), localized (`05/07/2025`), and RFC 3339
/// timestamps. Writes always normalize back to ISO via [`to_iso`].
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    None
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

/// String-to-bool coercion covering the spellings the backends emit.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "sim" | "t" | "y" | "yes"
    )
}

/// Parses a real number with either decimal separator. Not for money;
/// see [`parse_valor_monetario`] for currency strings.
///
/// [`parse_valor_monetario`]: crate::transporte::parse_valor_monetario
pub fn parse_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok()
}
