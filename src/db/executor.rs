//! Statement execution.
//!
//! Runs a [`CompiledStatement`] over a registered connection handle and turns
//! the outcome into a [`ResultSet`]:
//! - row-returning operations (`find`) hydrate their rows, and zero rows is a
//!   not-found failure
//! - writes run their statements in order and report the summed affected-row
//!   count; zero affected rows is still a success
//! - schema changes (`define`, `alter`, `drop`) always report zero affected rows
//!
//! No deadline is applied unless the caller asks for one with
//! [`Executor::with_timeout`].
//!
//! The executor never connects or reconnects. A handle whose connection was
//! closed fails with a transport error.
//!
//! Backend-specific code lives in the `mysql`, `postgres` and `sqlite`
//! submodules, which share one shape.

use crate::db::connection::{ConnectionHandle, DbConnection};
use crate::db::hydrate::hydrate;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::impl_db_dispatch;
use crate::models::{
    CompiledStatement, MAX_QUERY_TIMEOUT_SECS, ModelDescriptor, QueryParam, ResultSet, Statement,
};
use serde_json::{Map, Value as JsonValue};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Executes compiled statements against connection handles.
#[derive(Debug, Clone)]
pub struct Executor {
    timeout: Option<Duration>,
}

impl Executor {
    /// Executor without a statement timeout.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Executor with a custom timeout in seconds, capped at the maximum.
    /// Zero disables the timeout.
    pub fn with_timeout(secs: u64) -> Self {
        let timeout = match secs {
            0 => None,
            s => Some(Duration::from_secs(s.min(MAX_QUERY_TIMEOUT_SECS as u64))),
        };
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Execute `compiled` on `handle`, hydrating rows as `model`.
    pub async fn execute(
        &self,
        compiled: &CompiledStatement,
        model: &ModelDescriptor,
        handle: &ConnectionHandle,
    ) -> DbResult<ResultSet> {
        let start = Instant::now();
        let mut guard = handle.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| DbError::connection_closed(handle.id()))?;

        if compiled.operation.returns_rows() {
            let mut rows = Vec::new();
            for statement in &compiled.statements {
                log_statement(handle.id(), statement);
                rows.extend(self.fetch(conn, statement).await?);
            }
            drop(guard);

            if rows.is_empty() {
                debug!(
                    connection_id = %handle.id(),
                    model = %model.identity,
                    "No rows matched"
                );
                return Err(DbError::not_found(&model.identity));
            }

            let records = hydrate(rows, model);
            debug!(
                connection_id = %handle.id(),
                model = %model.identity,
                rows = records.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Query completed"
            );
            return Ok(ResultSet::from_records(records));
        }

        let mut rows_affected = 0;
        for (idx, statement) in compiled.statements.iter().enumerate() {
            log_statement(handle.id(), statement);
            match self.write(conn, statement).await {
                // SQLite reports the previous DML count for DDL
                Ok(_) if compiled.operation.is_schema_change() => {}
                Ok(n) => rows_affected += n,
                Err(e) => {
                    if idx > 0 {
                        warn!(
                            connection_id = %handle.id(),
                            completed = idx,
                            total = compiled.statements.len(),
                            "Statement sequence stopped part way, earlier statements were not rolled back"
                        );
                    }
                    return Err(e);
                }
            }
        }

        debug!(
            connection_id = %handle.id(),
            operation = %compiled.operation,
            rows_affected,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Statement completed"
        );
        Ok(ResultSet::write_result(rows_affected))
    }

    async fn fetch(
        &self,
        conn: &mut DbConnection,
        statement: &Statement,
    ) -> DbResult<Vec<Map<String, JsonValue>>> {
        let (sql, params) = (statement.sql.as_str(), statement.params.as_slice());
        impl_db_dispatch!(conn, {
            MySql(c) => self.bounded("query execution", mysql::fetch_rows(c, sql, params)).await,
            Postgres(c) => self.bounded("query execution", postgres::fetch_rows(c, sql, params)).await,
            SQLite(c) => self.bounded("query execution", sqlite::fetch_rows(c, sql, params)).await,
        })
    }

    async fn write(&self, conn: &mut DbConnection, statement: &Statement) -> DbResult<u64> {
        let (sql, params) = (statement.sql.as_str(), statement.params.as_slice());
        impl_db_dispatch!(conn, {
            MySql(c) => self.bounded("write operation", mysql::execute_write(c, sql, params)).await,
            Postgres(c) => self.bounded("write operation", postgres::execute_write(c, sql, params)).await,
            SQLite(c) => self.bounded("write operation", sqlite::execute_write(c, sql, params)).await,
        })
    }

    async fn bounded<T, F>(&self, operation: &str, future: F) -> DbResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| DbError::timeout(operation, limit.as_secs() as u32))?,
            None => future.await,
        };
        result.map_err(DbError::from)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

fn log_statement(connection_id: &str, statement: &Statement) {
    debug!(
        connection_id = %connection_id,
        sql = %statement.sql,
        params = statement.params.len(),
        "Executing statement"
    );
}

// When there are no parameters the raw SQL path is used; DDL such as
// CREATE TABLE is not preparable on every backend.

mod mysql {
    use super::*;
    use crate::db::params::mysql_query;
    use sqlx::{Executor as _, MySqlConnection};

    pub async fn fetch_rows(
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<Map<String, JsonValue>>, sqlx::Error> {
        let rows = if params.is_empty() {
            (&mut *conn).fetch_all(sql).await?
        } else {
            mysql_query(sql, params).fetch_all(&mut *conn).await?
        };
        Ok(rows.iter().map(RowToJson::to_json_map).collect())
    }

    pub async fn execute_write(
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<u64, sqlx::Error> {
        let result = if params.is_empty() {
            (&mut *conn).execute(sql).await?
        } else {
            mysql_query(sql, params).execute(&mut *conn).await?
        };
        Ok(result.rows_affected())
    }
}

mod postgres {
    use super::*;
    use crate::db::params::postgres_query;
    use sqlx::{Executor as _, PgConnection};

    pub async fn fetch_rows(
        conn: &mut PgConnection,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<Map<String, JsonValue>>, sqlx::Error> {
        let rows = if params.is_empty() {
            (&mut *conn).fetch_all(sql).await?
        } else {
            postgres_query(sql, params).fetch_all(&mut *conn).await?
        };
        Ok(rows.iter().map(RowToJson::to_json_map).collect())
    }

    pub async fn execute_write(
        conn: &mut PgConnection,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<u64, sqlx::Error> {
        let result = if params.is_empty() {
            (&mut *conn).execute(sql).await?
        } else {
            postgres_query(sql, params).execute(&mut *conn).await?
        };
        Ok(result.rows_affected())
    }
}

mod sqlite {
    use super::*;
    use crate::db::params::sqlite_query;
    use sqlx::{Executor as _, SqliteConnection};

    pub async fn fetch_rows(
        conn: &mut SqliteConnection,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<Map<String, JsonValue>>, sqlx::Error> {
        let rows = if params.is_empty() {
            (&mut *conn).fetch_all(sql).await?
        } else {
            sqlite_query(sql, params).fetch_all(&mut *conn).await?
        };
        Ok(rows.iter().map(RowToJson::to_json_map).collect())
    }

    pub async fn execute_write(
        conn: &mut SqliteConnection,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<u64, sqlx::Error> {
        let result = if params.is_empty() {
            (&mut *conn).execute(sql).await?
        } else {
            sqlite_query(sql, params).execute(&mut *conn).await?
        };
        Ok(result.rows_affected())
    }
}
