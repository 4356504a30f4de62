//! Parameter binding for compiled statements.
//!
//! Placeholders are bound in the order the compiler emitted them.

use crate::models::QueryParam;
use sqlx::mysql::MySqlArguments;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, Postgres, Sqlite};

macro_rules! bind_all {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                QueryParam::Null => query.bind(None::<String>),
                QueryParam::Bool(v) => query.bind(*v),
                QueryParam::Int(v) => query.bind(*v),
                QueryParam::Float(v) => query.bind(*v),
                QueryParam::String(v) => query.bind(v.as_str()),
            };
        }
        query
    }};
}

pub(crate) fn mysql_query<'q>(
    sql: &'q str,
    params: &'q [QueryParam],
) -> Query<'q, MySql, MySqlArguments> {
    bind_all!(sqlx::query(sql), params)
}

pub(crate) fn postgres_query<'q>(
    sql: &'q str,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    bind_all!(sqlx::query(sql), params)
}

pub(crate) fn sqlite_query<'q>(
    sql: &'q str,
    params: &'q [QueryParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    bind_all!(sqlx::query(sql), params)
}
