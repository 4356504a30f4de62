//! SQL dialects.
//!
//! A [`Dialect`] is the small capability the statement compiler is parameterized
//! by: column type constants, identifier quoting, the date constructor and the
//! sea-query backend that renders DML. Adding a backend means implementing this
//! trait, never copying the compiler.

use crate::models::ColumnDefinition;
use crate::sql::hana::HanaQueryBuilder;
use crate::sql::type_mapper;
use sea_query::{
    DeleteStatement, InsertStatement, MysqlQueryBuilder, PostgresQueryBuilder,
    QueryStatementWriter, SelectStatement, SqliteQueryBuilder, UpdateStatement, Values,
};

/// Render DML statements through one sea-query backend.
macro_rules! sea_backend {
    ($builder:expr) => {
        fn build_select(&self, stmt: &SelectStatement) -> (String, Values) {
            stmt.build($builder)
        }

        fn build_insert(&self, stmt: &InsertStatement) -> (String, Values) {
            stmt.build($builder)
        }

        fn build_update(&self, stmt: &UpdateStatement) -> (String, Values) {
            stmt.build($builder)
        }

        fn build_delete(&self, stmt: &DeleteStatement) -> (String, Values) {
            stmt.build($builder)
        }
    };
}

pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Human-readable dialect name.
    fn name(&self) -> &'static str;

    /// Fixed-width integer column type.
    fn integer_type(&self) -> &'static str;

    /// Variable-width string column type, width included.
    fn string_type(&self) -> &'static str {
        "VARCHAR(256)"
    }

    /// Quote a table or column identifier.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Marker for the first value bound inside a custom expression template.
    fn template_marker(&self) -> &'static str {
        "?"
    }

    /// Wrap a placeholder bound to `yyyy-mm-dd hh:mm:ss` text in the dialect's
    /// date constructor call.
    fn date_constructor(&self, placeholder: &str) -> String;

    fn build_select(&self, stmt: &SelectStatement) -> (String, Values);

    fn build_insert(&self, stmt: &InsertStatement) -> (String, Values);

    fn build_update(&self, stmt: &UpdateStatement) -> (String, Values);

    fn build_delete(&self, stmt: &DeleteStatement) -> (String, Values);

    /// `ADD ...` fragment of an `ALTER TABLE` adding one column.
    fn add_column(&self, column_clause: &str) -> String {
        format!("ADD ({})", column_clause)
    }

    /// Column clause used in `CREATE TABLE` and `ALTER TABLE`.
    fn map_column(&self, name: &str, column: &ColumnDefinition) -> String {
        type_mapper::map_column(self, name, column)
    }
}

// ─── SAP HANA ────────────────────────────────────────────────────────────────
//
// Compile-only: there is no transport for HANA, statements can be rendered and
// handed to an external client.

#[derive(Debug, Clone, Copy, Default)]
pub struct HanaDialect;

impl Dialect for HanaDialect {
    fn name(&self) -> &'static str {
        "SAP HANA"
    }

    fn integer_type(&self) -> &'static str {
        "INTEGER(5)"
    }

    fn date_constructor(&self, placeholder: &str) -> String {
        format!("TO_DATE({}, 'yyyy-mm-dd hh24:mi:ss')", placeholder)
    }

    sea_backend!(HanaQueryBuilder);
}

// ─── PostgreSQL ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    // INTEGER takes no width in PostgreSQL.
    fn integer_type(&self) -> &'static str {
        "INTEGER"
    }

    fn template_marker(&self) -> &'static str {
        "$1"
    }

    fn date_constructor(&self, placeholder: &str) -> String {
        format!("TO_TIMESTAMP({}, 'YYYY-MM-DD HH24:MI:SS')", placeholder)
    }

    fn add_column(&self, column_clause: &str) -> String {
        format!("ADD COLUMN {}", column_clause)
    }

    sea_backend!(PostgresQueryBuilder);
}

// ─── MySQL / MariaDB ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn integer_type(&self) -> &'static str {
        "INT(5)"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn date_constructor(&self, placeholder: &str) -> String {
        format!("STR_TO_DATE({}, '%Y-%m-%d %H:%i:%s')", placeholder)
    }

    sea_backend!(MysqlQueryBuilder);
}

// ─── SQLite ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn integer_type(&self) -> &'static str {
        "INTEGER(5)"
    }

    fn date_constructor(&self, placeholder: &str) -> String {
        format!("datetime({})", placeholder)
    }

    // SQLite only accepts a single unparenthesized column definition.
    fn add_column(&self, column_clause: &str) -> String {
        format!("ADD COLUMN {}", column_clause)
    }

    sea_backend!(SqliteQueryBuilder);
}

pub static HANA: HanaDialect = HanaDialect;
pub static POSTGRES: PostgresDialect = PostgresDialect;
pub static MYSQL: MySqlDialect = MySqlDialect;
pub static SQLITE: SqliteDialect = SqliteDialect;

/// Look up a dialect by name (case-insensitive).
pub fn dialect_by_name(name: &str) -> Option<&'static dyn Dialect> {
    match name.to_lowercase().as_str() {
        "hana" | "saphana" | "sap hana" => Some(&HANA),
        "postgres" | "postgresql" => Some(&POSTGRES),
        "mysql" | "mariadb" => Some(&MYSQL),
        "sqlite" => Some(&SQLITE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::{Alias, Expr, Query};

    #[test]
    fn test_quote_identifier_escapes() {
        assert_eq!(POSTGRES.quote_identifier("user"), "\"user\"");
        assert_eq!(POSTGRES.quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(MYSQL.quote_identifier("order"), "`order`");
        assert_eq!(MYSQL.quote_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_backends_pick_placeholder_style() {
        let stmt = Query::delete()
            .from_table(Alias::new("users"))
            .and_where(Expr::col(Alias::new("id")).eq(3))
            .to_owned();
        assert_eq!(
            POSTGRES.build_delete(&stmt).0,
            "DELETE FROM \"users\" WHERE \"id\" = $1"
        );
        assert_eq!(
            MYSQL.build_delete(&stmt).0,
            "DELETE FROM `users` WHERE `id` = ?"
        );
        assert_eq!(
            SQLITE.build_delete(&stmt).0,
            "DELETE FROM \"users\" WHERE \"id\" = ?"
        );
        assert_eq!(
            HANA.build_delete(&stmt).0,
            "DELETE FROM \"users\" WHERE \"id\" = ?"
        );
    }

    #[test]
    fn test_date_constructors_wrap_placeholder() {
        assert_eq!(
            HANA.date_constructor("?"),
            "TO_DATE(?, 'yyyy-mm-dd hh24:mi:ss')"
        );
        assert_eq!(
            POSTGRES.date_constructor("$2"),
            "TO_TIMESTAMP($2, 'YYYY-MM-DD HH24:MI:SS')"
        );
        assert_eq!(
            MYSQL.date_constructor("?"),
            "STR_TO_DATE(?, '%Y-%m-%d %H:%i:%s')"
        );
        assert_eq!(SQLITE.date_constructor("?"), "datetime(?)");
    }

    #[test]
    fn test_add_column_syntax() {
        assert_eq!(HANA.add_column("a DATE"), "ADD (a DATE)");
        assert_eq!(MYSQL.add_column("a DATE"), "ADD (a DATE)");
        assert_eq!(POSTGRES.add_column("a DATE"), "ADD COLUMN a DATE");
        assert_eq!(SQLITE.add_column("a DATE"), "ADD COLUMN a DATE");
    }

    #[test]
    fn test_dialect_by_name() {
        assert_eq!(dialect_by_name("HANA").map(|d| d.name()), Some("SAP HANA"));
        assert_eq!(
            dialect_by_name("postgresql").map(|d| d.name()),
            Some("PostgreSQL")
        );
        assert!(dialect_by_name("oracle").is_none());
    }
}
