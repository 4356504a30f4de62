//! Logical column type to dialect column clause.

use crate::models::{ColumnDefinition, LogicalType};
use crate::sql::dialect::Dialect;

/// Marker appended to primary key columns.
pub const PRIMARY_KEY_MARKER: &str = "PRIMARY KEY";

/// Map a column definition to its `CREATE TABLE` clause.
///
/// | logical type | clause |
/// |---|---|
/// | date | `<name> DATE` |
/// | datetime | `<name> TIMESTAMP` |
/// | integer | `<name> <fixed-width int>` |
/// | anything else | `<name> <varchar>(256)` |
///
/// Unknown types fall through to the string mapping; this never fails.
pub fn map_column<D: Dialect + ?Sized>(dialect: &D, name: &str, column: &ColumnDefinition) -> String {
    let sql_type = match column.logical_type {
        LogicalType::Date => "DATE",
        LogicalType::DateTime => "TIMESTAMP",
        LogicalType::Integer => dialect.integer_type(),
        _ => dialect.string_type(),
    };

    let mut clause = format!("{} {}", dialect.quote_identifier(name), sql_type);
    if column.primary_key {
        clause.push(' ');
        clause.push_str(PRIMARY_KEY_MARKER);
    }
    clause
}
