//! Table and model descriptors.
//!
//! A [`TableDescriptor`] is supplied by the caller for every request and is never
//! mutated by the compiler. Column order is the caller's insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Abstract column type as declared by the calling ORM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalType {
    String,
    Text,
    Date,
    DateTime,
    Integer,
    Float,
    Boolean,
    /// Any type name the mapper has no dedicated clause for.
    Other(String),
}

impl LogicalType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for LogicalType {
    fn from(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "string" => Self::String,
            "text" => Self::Text,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl From<String> for LogicalType {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<LogicalType> for String {
    fn from(ty: LogicalType) -> Self {
        ty.as_str().to_string()
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    #[serde(rename = "type")]
    pub logical_type: LogicalType,
    #[serde(default, alias = "primaryKey")]
    pub primary_key: bool,
}

impl ColumnDefinition {
    pub fn new(logical_type: impl Into<LogicalType>) -> Self {
        Self {
            logical_type: logical_type.into(),
            primary_key: false,
        }
    }

    /// Mark the column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Table name plus ordered column definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub columns: IndexMap<String, ColumnDefinition>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    /// Append a column, keeping declaration order.
    pub fn with_column(mut self, name: impl Into<String>, column: ColumnDefinition) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    /// Names of the primary key columns, in declaration order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(_, col)| col.primary_key)
            .map(|(name, _)| name.as_str())
    }
}

/// Model shape used to hydrate rows, registered alongside a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identity (collection name on the ORM side).
    pub identity: String,
    pub table: TableDescriptor,
}

impl ModelDescriptor {
    pub fn new(identity: impl Into<String>, table: TableDescriptor) -> Self {
        Self {
            identity: identity.into(),
            table,
        }
    }

    /// A model whose identity is the table name.
    pub fn for_table(table: TableDescriptor) -> Self {
        Self {
            identity: table.name.clone(),
            table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_type_parsing_is_case_insensitive() {
        assert_eq!(LogicalType::from("DateTime"), LogicalType::DateTime);
        assert_eq!(LogicalType::from("INTEGER"), LogicalType::Integer);
        assert_eq!(
            LogicalType::from("json"),
            LogicalType::Other("json".to_string())
        );
    }

    #[test]
    fn test_table_descriptor_deserialize_keeps_order() {
        let json = r#"{
            "name": "users",
            "columns": {
                "id": {"type": "integer", "primaryKey": true},
                "name": {"type": "string"},
                "created": {"type": "datetime"}
            }
        }"#;
        let table: TableDescriptor = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = table.columns.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "name", "created"]);
        assert!(table.columns["id"].primary_key);
        assert_eq!(table.columns["created"].logical_type, LogicalType::DateTime);
        assert_eq!(table.primary_keys().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_model_for_table_uses_table_name() {
        let model = ModelDescriptor::for_table(TableDescriptor::new("pets"));
        assert_eq!(model.identity, "pets");
    }
}
