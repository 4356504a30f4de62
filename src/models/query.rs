//! Request and result models.
//!
//! This module defines the abstract operation a caller asks for, the compiled
//! statements produced for it, and the hydrated records that come back.

use crate::models::value::{FieldValue, QueryParam};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default statement timeout in seconds applied by the command line.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 30;

/// Maximum statement timeout in seconds.
pub const MAX_QUERY_TIMEOUT_SECS: u32 = 300;

/// Abstract CRUD/DDL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Find,
    Insert,
    Update,
    Delete,
    Define,
    Alter,
    Drop,
}

impl Operation {
    /// Whether the operation writes an entity payload.
    pub fn requires_entity(&self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }

    /// Whether the operation returns rows to hydrate.
    pub fn returns_rows(&self) -> bool {
        matches!(self, Self::Find)
    }

    /// Whether the operation changes the schema rather than rows.
    pub fn is_schema_change(&self) -> bool {
        matches!(self, Self::Define | Self::Alter | Self::Drop)
    }

    /// Whether a `where` filter applies to the operation.
    pub fn accepts_filter(&self) -> bool {
        matches!(self, Self::Find | Self::Update | Self::Delete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Define => "define",
            Self::Alter => "alter",
            Self::Drop => "drop",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and paging options. Only equality filters are supported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<IndexMap<String, FieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn with_where(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filter
            .get_or_insert_with(IndexMap::new)
            .insert(column.into(), value.into());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

/// One executable SQL statement with its bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<QueryParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Output of the statement compiler.
///
/// Holds a single statement for every operation except `Alter`, which yields one
/// statement per added column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub operation: Operation,
    pub statements: Vec<Statement>,
}

impl CompiledStatement {
    pub fn single(operation: Operation, statement: Statement) -> Self {
        Self {
            operation,
            statements: vec![statement],
        }
    }

    /// SQL text of all statements, separated by `"; "`.
    pub fn sql(&self) -> String {
        self.statements
            .iter()
            .map(|s| s.sql.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// All bound parameters in statement order.
    pub fn params(&self) -> impl Iterator<Item = &QueryParam> {
        self.statements.iter().flat_map(|s| s.params.iter())
    }
}

/// A hydrated row of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Identity of the model the row was hydrated as.
    #[serde(skip)]
    pub model: String,
    #[serde(flatten)]
    pub values: serde_json::Map<String, JsonValue>,
}

impl Record {
    pub fn new(model: impl Into<String>, values: serde_json::Map<String, JsonValue>) -> Self {
        Self {
            model: model.into(),
            values,
        }
    }

    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.values.get(column)
    }

    /// Deserialize the record into a caller-defined struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(JsonValue::Object(self.values.clone()))
    }
}

/// Result of executing a compiled statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub records: Vec<Record>,
    pub rows_affected: u64,
}

impl ResultSet {
    pub fn from_records(records: Vec<Record>) -> Self {
        let rows_affected = records.len() as u64;
        Self {
            records,
            rows_affected,
        }
    }

    pub fn write_result(rows_affected: u64) -> Self {
        Self {
            records: Vec::new(),
            rows_affected,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_flags() {
        assert!(Operation::Insert.requires_entity());
        assert!(Operation::Update.requires_entity());
        assert!(!Operation::Delete.requires_entity());
        assert!(Operation::Find.returns_rows());
        assert!(!Operation::Alter.accepts_filter());
        assert!(Operation::Drop.is_schema_change());
        assert!(!Operation::Delete.is_schema_change());
    }

    #[test]
    fn test_operation_deserialize() {
        let op: Operation = serde_json::from_str("\"define\"").unwrap();
        assert_eq!(op, Operation::Define);
    }

    #[test]
    fn test_query_options_deserialize_where() {
        let opts: QueryOptions =
            serde_json::from_value(json!({"where": {"id": 5}, "limit": 10, "skip": 2})).unwrap();
        assert_eq!(opts, QueryOptions::new().with_where("id", 5).with_limit(10).with_skip(2));
    }

    #[test]
    fn test_compiled_statement_sql_joins() {
        let compiled = CompiledStatement {
            operation: Operation::Alter,
            statements: vec![
                Statement::new("ALTER TABLE t ADD (a DATE)", vec![]),
                Statement::new("ALTER TABLE t ADD (b DATE)", vec![]),
            ],
        };
        assert_eq!(
            compiled.sql(),
            "ALTER TABLE t ADD (a DATE); ALTER TABLE t ADD (b DATE)"
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    #[test]
    fn test_record_deserialize() {
        let values = json!({"id": 1, "name": "Ann"}).as_object().cloned().unwrap();
        let record = Record::new("user", values);
        assert_eq!(
            record.deserialize::<User>().unwrap(),
            User {
                id: 1,
                name: "Ann".into()
            }
        );
        assert_eq!(record.get("name"), Some(&json!("Ann")));
    }

    #[test]
    fn test_result_set_counts() {
        let set = ResultSet::write_result(3);
        assert!(set.is_empty());
        assert_eq!(set.rows_affected, 3);
    }
}
