//! Shared helpers for integration tests.

#![allow(dead_code)]

use sqlweave::models::{ColumnDefinition, ConnectionConfig, TableDescriptor};
use sqlweave::{AdapterService, ConnectionRegistry};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub fn users_table() -> TableDescriptor {
    TableDescriptor::new("users")
        .with_column("id", ColumnDefinition::new("integer").primary_key())
        .with_column("name", ColumnDefinition::new("string"))
        .with_column("created", ColumnDefinition::new("datetime"))
}

pub fn memory_config(id: &str) -> ConnectionConfig {
    ConnectionConfig::new(id, "sqlite::memory:").expect("valid config")
}

/// Service with one in-memory SQLite connection registered as `id`.
pub async fn memory_service(id: &str) -> AdapterService {
    let service = AdapterService::new(Arc::new(ConnectionRegistry::new()));
    service
        .register_connection(memory_config(id), Vec::new())
        .await
        .expect("Failed to register connection");
    service
}

/// File-backed SQLite URL; the file lives as long as the returned guard.
pub fn temp_sqlite_url() -> (String, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let url = format!("sqlite:{}", temp_file.path().to_str().expect("utf-8 path"));
    (url, temp_file)
}
