//! Field values and bound parameters.
//!
//! [`FieldValue`] is what callers put in entities and filters. [`QueryParam`] is
//! what actually gets bound to a placeholder once the coercer has run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// JSON object key used to mark a date/time value in JSON input.
pub const DATE_MARKER_KEY: &str = "$date";

/// Abstract value for a single field.
///
/// Serializes to the same JSON it is read from: dates and timestamps are
/// written back inside a `{"$date": ..}` marker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "JsonValue")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a JSON value.
    ///
    /// Strings stay text; `{"$date": "<rfc3339 or yyyy-mm-dd>"}` becomes a date value.
    /// Other arrays and objects are stored as their JSON text.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Self::Text(s),
            JsonValue::Object(map) => match map.get(DATE_MARKER_KEY).and_then(|v| v.as_str()) {
                Some(raw) if map.len() == 1 => {
                    parse_date_marker(raw).unwrap_or_else(|| Self::Text(raw.to_string()))
                }
                _ => Self::Text(JsonValue::Object(map).to_string()),
            },
            other => Self::Text(other.to_string()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let marked = |text: String, serializer: S| {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(DATE_MARKER_KEY, &text)?;
            map.end()
        };
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Date(d) => marked(d.format("%Y-%m-%d").to_string(), serializer),
            Self::DateTime(dt) => marked(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(), serializer),
        }
    }
}

fn parse_date_marker(raw: &str) -> Option<FieldValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(FieldValue::DateTime(dt.naive_utc()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(FieldValue::DateTime(dt));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(FieldValue::Date)
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        Self::from_json(value)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v.naive_utc())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Values to write, keyed by column name.
pub type Entity = IndexMap<String, FieldValue>;

/// A parameter value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    Float(f64),
    String(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_temporal_values_serialize_with_marker() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(10, 20, 30, 250)
            .unwrap();
        let encoded = serde_json::to_value(FieldValue::DateTime(dt)).unwrap();
        assert_eq!(encoded, json!({"$date": "2024-03-05 10:20:30.250"}));
        assert_eq!(
            serde_json::from_value::<FieldValue>(encoded).unwrap(),
            FieldValue::DateTime(dt)
        );

        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let encoded = serde_json::to_value(&date).unwrap();
        assert_eq!(encoded, json!({"$date": "2024-03-05"}));
        assert_eq!(serde_json::from_value::<FieldValue>(encoded).unwrap(), date);
    }

    #[test]
    fn test_scalar_values_serialize_plainly() {
        let entity: Entity = [
            ("a".to_string(), FieldValue::Null),
            ("b".to_string(), FieldValue::Int(3)),
            ("c".to_string(), FieldValue::from("x")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_value(&entity).unwrap(),
            json!({"a": null, "b": 3, "c": "x"})
        );
    }

    #[test]
    fn test_field_value_from_json_scalars() {
        assert_eq!(FieldValue::from_json(json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(json!(5)), FieldValue::Int(5));
        assert_eq!(FieldValue::from_json(json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(
            FieldValue::from_json(json!("2024-01-01")),
            FieldValue::Text("2024-01-01".into())
        );
    }

    #[test]
    fn test_field_value_date_marker() {
        let value = FieldValue::from_json(json!({"$date": "2024-03-05T10:20:30.250Z"}));
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(10, 20, 30, 250)
            .unwrap();
        assert_eq!(value, FieldValue::DateTime(expected));

        let value = FieldValue::from_json(json!({"$date": "2024-03-05"}));
        assert_eq!(
            value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
    }

    #[test]
    fn test_entity_deserializes_from_json_object() {
        let entity: Entity = serde_json::from_value(json!({"name": "Ann", "age": 31})).unwrap();
        assert_eq!(entity["name"], FieldValue::Text("Ann".into()));
        assert_eq!(entity["age"], FieldValue::Int(31));
    }

    #[test]
    fn test_option_into_field_value() {
        let none: Option<i64> = None;
        assert!(FieldValue::from(none).is_null());
        assert_eq!(FieldValue::from(Some("x")), FieldValue::Text("x".into()));
    }
}
