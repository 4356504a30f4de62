//! Field value to bindable parameter.
//!
//! Dates and timestamps are tagged so the compiler wraps their placeholder in the
//! dialect's date constructor instead of binding them as plain strings. Nulls are
//! tagged too: they render as the `NULL` keyword, since an untyped bound null is
//! rejected by PostgreSQL for non-text columns.

use crate::models::{FieldValue, QueryParam};

/// Text format bound into date constructors, second precision.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of coercing a [`FieldValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Bound as-is.
    Bind(QueryParam),
    /// `yyyy-mm-dd hh:mm:ss` text to be passed through the date constructor.
    Date(String),
    /// The `NULL` keyword, never bound.
    Null,
}

/// Coerce a field value for binding.
pub fn coerce(value: &FieldValue) -> Coerced {
    match value {
        FieldValue::Date(date) => Coerced::Date(
            date.and_time(chrono::NaiveTime::MIN)
                .format(DATE_TIME_FORMAT)
                .to_string(),
        ),
        FieldValue::DateTime(dt) => Coerced::Date(dt.format(DATE_TIME_FORMAT).to_string()),
        FieldValue::Null => Coerced::Null,
        FieldValue::Bool(v) => Coerced::Bind(QueryParam::Bool(*v)),
        FieldValue::Int(v) => Coerced::Bind(QueryParam::Int(*v)),
        FieldValue::Float(v) => Coerced::Bind(QueryParam::Float(*v)),
        FieldValue::Text(v) => Coerced::Bind(QueryParam::String(v.clone())),
    }
}
