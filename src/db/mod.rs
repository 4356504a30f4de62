//! Database access layer.
//!
//! This module provides database access functionality:
//! - Connection handles and the connection registry
//! - Statement execution
//! - Parameter binding and row decoding
//! - Result hydration
//! - Database dispatch macros for reducing code duplication

pub mod connection;
pub mod executor;
pub mod hydrate;
#[macro_use]
pub mod macros;
pub mod params;
pub mod registry;
pub mod types;

pub use connection::{ConnectionHandle, DbConnection};
pub use executor::Executor;
pub use hydrate::hydrate;
pub use registry::ConnectionRegistry;
pub use types::{RowToJson, TypeCategory, categorize_type};
