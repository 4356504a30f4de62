//! sqlweave
//!
//! Compiles abstract, storage-agnostic CRUD and DDL requests into dialect SQL
//! (PostgreSQL, MySQL, SQLite, HANA), executes them over registered connections
//! and hydrates the returned rows into records.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod sql;
pub mod transport;

pub use config::Config;
pub use db::{ConnectionRegistry, Executor};
pub use error::{DbError, DbResult};
pub use service::AdapterService;
pub use sql::{Dialect, StatementCompiler};
