//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing and rounding so every module agrees on the same rules.

use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse an optional UUID column.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::InvalidAmount(format!("invalid currency: {value}")))
}

/// Integer division rounding half away from zero.
///
/// `denominator` must be positive.
pub(crate) fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// Narrow an `i128` intermediate back into minor units.
pub(crate) fn to_minor(value: i128) -> ResultEngine<i64> {
    i64::try_from(value).map_err(|_| EngineError::InvalidAmount("amount too large".to_string()))
}

/// Parses a non-signed decimal with at most two fraction digits into hundredths.
///
/// Accepts `.` or `,` as decimal separator (`"10"`, `"10.5"`, `"10,50"`).
pub(crate) fn parse_hundredths(raw: &str) -> ResultEngine<i64> {
    let invalid = || EngineError::InvalidAmount(format!("invalid number: {raw}"));

    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(EngineError::InvalidAmount("empty amount".to_string()));
    }

    let (whole, fraction) = match normalized.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (normalized.as_str(), ""),
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let fraction_value = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        2 => fraction.parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
    };

    whole
        .parse::<i64>()
        .map_err(|_| invalid())?
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
}
