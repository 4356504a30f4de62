//! SQL generation.
//!
//! This module turns abstract requests into dialect SQL:
//! - Dialect capability (quoting, column types, date constructor, sea-query backend)
//! - Type mapping for `CREATE TABLE` / `ALTER TABLE` column clauses
//! - Value coercion for bound parameters
//! - The statement compiler itself

pub mod builder;
pub mod coerce;
pub mod compiler;
pub mod dialect;
pub mod hana;
pub mod type_mapper;

pub use builder::{render, value_expr};
pub use coerce::{Coerced, coerce};
pub use compiler::StatementCompiler;
pub use dialect::{
    Dialect, HANA, HanaDialect, MYSQL, MySqlDialect, POSTGRES, PostgresDialect, SQLITE,
    SqliteDialect, dialect_by_name,
};
pub use hana::HanaQueryBuilder;
pub use type_mapper::map_column;
