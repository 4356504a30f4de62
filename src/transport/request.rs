//! JSON-lines request protocol.
//!
//! Each input line is one [`Request`]; each output line is one [`Response`].

use crate::error::DbError;
use crate::models::{Entity, Operation, QueryOptions, Record, ResultSet, TableDescriptor};
use crate::service::AdapterService;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A single adapter request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Registered connection identity.
    pub connection: String,
    pub operation: Operation,
    pub table: TableDescriptor,
    #[serde(default)]
    pub entity: Option<Entity>,
    #[serde(default)]
    pub options: Option<QueryOptions>,
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Response {
    pub fn success(result: ResultSet) -> Self {
        Self {
            ok: true,
            records: Some(result.records),
            rows_affected: Some(result.rows_affected),
            error: None,
            kind: None,
            suggestion: None,
        }
    }

    pub fn failure(error: &DbError) -> Self {
        Self {
            ok: false,
            records: None,
            rows_affected: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
            suggestion: error.suggestion().map(String::from),
        }
    }

    /// Serialize as one line of JSON.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"ok":false,"error":"Failed to serialize response: {}","kind":"internal"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

/// Parse and execute one input line.
pub async fn handle_line(service: &AdapterService, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Malformed request");
            return Response::failure(&DbError::invalid_input(format!(
                "Malformed request: {}",
                e
            )));
        }
    };
    handle(service, request).await
}

pub async fn handle(service: &AdapterService, request: Request) -> Response {
    debug!(
        connection_id = %request.connection,
        operation = %request.operation,
        table = %request.table.name,
        "Received request"
    );

    let result = service
        .run(
            &request.connection,
            request.operation,
            &request.table,
            request.entity.as_ref(),
            request.options.as_ref(),
        )
        .await;

    match result {
        Ok(result) => Response::success(result),
        Err(e) => {
            if e.is_not_found() {
                debug!(connection_id = %request.connection, "No records found");
            } else {
                warn!(connection_id = %request.connection, error = %e, "Request failed");
            }
            Response::failure(&e)
        }
    }
}
