//! Typed coercion of raw filter values.
//!
//! Raw parameter values arrive as strings (scalar or per array element) and
//! are coerced according to the configured [`ValueType`] before they are bound
//! into predicates. Coercion is strict: values that do not parse are rejected
//! with a [`CoerceError`] rather than silently collapsing to zero, and the
//! engine skips the offending filter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::Value;
use std::fmt;

use super::config::ValueType;

/// Accepted datetime layouts, tried in order after an epoch parse.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Accepted date-only layouts.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// A coerced filter value, ready to bind into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        match value {
            TypedValue::Str(s) => s.into(),
            TypedValue::Int(i) => i.into(),
            TypedValue::Float(f) => f.into(),
            TypedValue::Bool(b) => b.into(),
            TypedValue::Date(d) => d.into(),
        }
    }
}

/// A raw value that could not be interpreted as the configured type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub expected: ValueType,
    pub raw: String,
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot interpret {:?} as {}", self.raw, self.expected)
    }
}

impl std::error::Error for CoerceError {}

/// Coerce one raw value to the configured type.
///
/// # Errors
///
/// Returns a [`CoerceError`] when the trimmed input does not parse as the
/// expected type.
pub fn coerce(raw: &str, value_type: ValueType) -> Result<TypedValue, CoerceError> {
    let trimmed = raw.trim();
    let fail = || CoerceError {
        expected: value_type,
        raw: raw.to_string(),
    };

    match value_type {
        ValueType::Str => Ok(TypedValue::Str(trimmed.to_string())),
        ValueType::Int => trimmed
            .parse::<i64>()
            .map(TypedValue::Int)
            .map_err(|_| fail()),
        ValueType::Float => trimmed
            .parse::<f64>()
            .map(TypedValue::Float)
            .map_err(|_| fail()),
        ValueType::Bool => parse_bool(trimmed).map(TypedValue::Bool).ok_or_else(fail),
        ValueType::Date => parse_date(trimmed).map(TypedValue::Date).ok_or_else(fail),
    }
}

/// Common truthy and falsy string representations.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Permissive date parsing: epoch seconds, then common datetime layouts,
/// then date-only layouts. The result is always a date without a time
/// component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(epoch) = raw.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0).map(|dt| dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}
