//! Row decoding.
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the column's declared type
//! 2. Backend-specific decoders extract the value as JSON
//!
//! Decoding never fails a request: a value that cannot be decoded becomes
//! `null` and is logged.

use crate::models::DatabaseType;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Value as JsonValue};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo};

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Text,
    Binary,
    Json,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Checked first, "numeric" would otherwise never reach the float branch
    if lower.contains("decimal") || lower.contains("numeric") {
        if db == DatabaseType::SQLite {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower.contains("date") || lower.contains("time") {
        // SQLite stores temporal values as TEXT
        if db == DatabaseType::SQLite {
            return TypeCategory::Text;
        }
        return TypeCategory::Temporal;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    TypeCategory::Text
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn binary_value(bytes: &[u8]) -> JsonValue {
    JsonValue::String(STANDARD.encode(bytes))
}

/// Convert a decoded row into a column-name → JSON map, in column order.
pub trait RowToJson {
    fn to_json_map(&self) -> Map<String, JsonValue>;
}

macro_rules! impl_row_to_json {
    ($row:ty, $db:expr, $decoder:path) => {
        impl RowToJson for $row {
            fn to_json_map(&self) -> Map<String, JsonValue> {
                self.columns()
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| {
                        let category = categorize_type(col.type_info().name(), $db);
                        (col.name().to_string(), $decoder(self, idx, category))
                    })
                    .collect()
            }
        }
    };
}

impl_row_to_json!(MySqlRow, DatabaseType::MySQL, mysql::decode_column);
impl_row_to_json!(PgRow, DatabaseType::PostgreSQL, postgres::decode_column);
impl_row_to_json!(SqliteRow, DatabaseType::SQLite, sqlite::decode_column);

mod mysql {
    use super::*;
    use rust_decimal::Decimal;

    pub fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Decimal => match row.try_get::<Option<Decimal>, _>(idx) {
                Ok(v) => v.map_or(JsonValue::Null, |d| JsonValue::String(d.to_string())),
                Err(e) => {
                    tracing::error!(column = idx, error = %e, "Failed to decode DECIMAL");
                    JsonValue::Null
                }
            },
            TypeCategory::Boolean => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, JsonValue::Bool),
            TypeCategory::Temporal => decode_temporal(row, idx),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, |b| binary_value(&b)),
            TypeCategory::Json => row
                .try_get::<Option<JsonValue>, _>(idx)
                .ok()
                .flatten()
                .unwrap_or(JsonValue::Null),
            TypeCategory::Text => decode_text(row, idx),
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            return v.map_or(JsonValue::Null, |v| JsonValue::Number(v.into()));
        }
        // Narrower and unsigned widths are not compatible with i64 in sqlx
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return float_value(v as f64);
        }
        JsonValue::Null
    }

    fn decode_temporal(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
            return JsonValue::String(v.to_string());
        }
        if let Ok(Some(v)) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
            return JsonValue::String(v.to_rfc3339());
        }
        if let Ok(Some(v)) = row.try_get::<Option<NaiveDate>, _>(idx) {
            return JsonValue::String(v.to_string());
        }
        if let Ok(Some(v)) = row.try_get::<Option<NaiveTime>, _>(idx) {
            return JsonValue::String(v.to_string());
        }
        decode_text(row, idx)
    }

    fn decode_text(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map_or(JsonValue::Null, JsonValue::String)
    }
}

mod postgres {
    use super::*;
    use rust_decimal::Decimal;

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Float => {
                if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
                    return float_value(v);
                }
                row.try_get::<Option<f32>, _>(idx)
                    .ok()
                    .flatten()
                    .map_or(JsonValue::Null, |v| float_value(v as f64))
            }
            TypeCategory::Decimal => match row.try_get::<Option<Decimal>, _>(idx) {
                Ok(v) => v.map_or(JsonValue::Null, |d| JsonValue::String(d.to_string())),
                Err(e) => {
                    tracing::error!(column = idx, error = %e, "Failed to decode NUMERIC");
                    JsonValue::Null
                }
            },
            TypeCategory::Boolean => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, JsonValue::Bool),
            TypeCategory::Temporal => decode_temporal(row, idx),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, |b| binary_value(&b)),
            TypeCategory::Json => row
                .try_get::<Option<JsonValue>, _>(idx)
                .ok()
                .flatten()
                .unwrap_or(JsonValue::Null),
            TypeCategory::Text => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, JsonValue::String),
        }
    }

    fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            return v.map_or(JsonValue::Null, |v| JsonValue::Number(v.into()));
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_temporal(row: &PgRow, idx: usize) -> JsonValue {
        let name = row.column(idx).type_info().name().to_lowercase();
        let value = match name.as_str() {
            "timestamptz" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)
                .map(|v| v.map(|v| v.to_rfc3339())),
            "timestamp" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)
                .map(|v| v.map(|v| v.to_string())),
            "date" => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .map(|v| v.map(|v| v.to_string())),
            "time" => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .map(|v| v.map(|v| v.to_string())),
            _ => row.try_get::<Option<String>, _>(idx),
        };
        match value {
            Ok(v) => v.map_or(JsonValue::Null, JsonValue::String),
            Err(e) => {
                tracing::error!(column = idx, type_name = %name, error = %e, "Failed to decode temporal value");
                JsonValue::Null
            }
        }
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Integer => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, |v| JsonValue::Number(v.into())),
            TypeCategory::Float | TypeCategory::Decimal => row
                .try_get::<Option<f64>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, float_value),
            TypeCategory::Boolean => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, JsonValue::Bool),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)
                .ok()
                .flatten()
                .map_or(JsonValue::Null, |b| binary_value(&b)),
            _ => decode_dynamic(row, idx),
        }
    }

    /// Columns without a usable declared type (expressions, `NULL` type, TEXT
    /// holding numbers) decode by trying the storage classes in turn.
    fn decode_dynamic(row: &SqliteRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            return JsonValue::String(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
            return binary_value(&v);
        }
        JsonValue::Null
    }
}
