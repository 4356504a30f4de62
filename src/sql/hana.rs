//! sea-query backend for SAP HANA.
//!
//! HANA quotes identifiers with double quotes, binds with positional `?` and
//! pages with `LIMIT n OFFSET m`, which is what the SQLite backend renders for
//! the statement shapes compiled here. Operator precedence decisions are
//! borrowed from that backend as well.

use sea_query::{
    BinOper, EscapeBuilder, Oper, OperLeftAssocDecider, PrecedenceDecider, QueryBuilder, Quote,
    QuotedBuilder, SimpleExpr, SqlWriter, SqliteQueryBuilder, SubQueryStatement, TableRefBuilder, Value,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct HanaQueryBuilder;

impl QuotedBuilder for HanaQueryBuilder {
    fn quote(&self) -> Quote {
        SqliteQueryBuilder.quote()
    }
}

impl EscapeBuilder for HanaQueryBuilder {}

impl TableRefBuilder for HanaQueryBuilder {}

impl OperLeftAssocDecider for HanaQueryBuilder {
    fn well_known_left_associative(&self, op: &BinOper) -> bool {
        SqliteQueryBuilder.well_known_left_associative(op)
    }
}

impl PrecedenceDecider for HanaQueryBuilder {
    fn inner_expr_well_known_greater_precedence(
        &self,
        inner: &SimpleExpr,
        outer_oper: &Oper,
    ) -> bool {
        SqliteQueryBuilder.inner_expr_well_known_greater_precedence(inner, outer_oper)
    }
}

impl QueryBuilder for HanaQueryBuilder {
    // Subqueries are never compiled for HANA
    fn prepare_query_statement(&self, query: &SubQueryStatement, sql: &mut dyn SqlWriter) {
        SqliteQueryBuilder.prepare_query_statement(query, sql);
    }

    fn prepare_value(&self, value: &Value, sql: &mut dyn SqlWriter) {
        sql.push_param(value.clone(), self as _);
    }
}
