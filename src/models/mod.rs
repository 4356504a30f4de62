//! Data models for sqlweave.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;
pub mod table;
pub mod value;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionConfigError, ConnectionInfo, DatabaseType};
pub use query::{
    CompiledStatement, DEFAULT_QUERY_TIMEOUT_SECS, MAX_QUERY_TIMEOUT_SECS, Operation,
    QueryOptions, Record, ResultSet, Statement,
};
pub use table::{ColumnDefinition, LogicalType, ModelDescriptor, TableDescriptor};
pub use value::{Entity, FieldValue, QueryParam};
