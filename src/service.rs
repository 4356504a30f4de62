//! Adapter service.
//!
//! Entry point for callers: resolves the connection identity in the registry,
//! compiles the request with the connection's dialect, executes it and returns
//! hydrated records.

use crate::db::{ConnectionHandle, ConnectionRegistry, Executor};
use crate::error::DbResult;
use crate::models::{
    ConnectionConfig, ConnectionInfo, Entity, ModelDescriptor, Operation, QueryOptions, ResultSet,
    TableDescriptor,
};
use crate::sql::StatementCompiler;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AdapterService {
    registry: Arc<ConnectionRegistry>,
    executor: Executor,
}

impl AdapterService {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self::with_executor(registry, Executor::new())
    }

    pub fn with_executor(registry: Arc<ConnectionRegistry>, executor: Executor) -> Self {
        Self { registry, executor }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub async fn register_connection(
        &self,
        config: ConnectionConfig,
        models: Vec<ModelDescriptor>,
    ) -> DbResult<ConnectionInfo> {
        self.registry.register(config, models).await
    }

    pub async fn teardown(&self, connection_id: Option<&str>) -> DbResult<()> {
        self.registry.teardown(connection_id).await
    }

    /// Create the table.
    pub async fn define(&self, connection_id: &str, table: &TableDescriptor) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Define, table, None, None)
            .await
    }

    /// Add every column of `table` to the existing table.
    pub async fn alter(&self, connection_id: &str, table: &TableDescriptor) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Alter, table, None, None)
            .await
    }

    pub async fn drop(&self, connection_id: &str, table: &TableDescriptor) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Drop, table, None, None)
            .await
    }

    /// Select matching rows. No match is a not-found error.
    pub async fn find(
        &self,
        connection_id: &str,
        table: &TableDescriptor,
        options: Option<&QueryOptions>,
    ) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Find, table, None, options)
            .await
    }

    pub async fn create(
        &self,
        connection_id: &str,
        table: &TableDescriptor,
        entity: &Entity,
    ) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Insert, table, Some(entity), None)
            .await
    }

    pub async fn update(
        &self,
        connection_id: &str,
        table: &TableDescriptor,
        entity: &Entity,
        options: Option<&QueryOptions>,
    ) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Update, table, Some(entity), options)
            .await
    }

    pub async fn destroy(
        &self,
        connection_id: &str,
        table: &TableDescriptor,
        options: Option<&QueryOptions>,
    ) -> DbResult<ResultSet> {
        self.run(connection_id, Operation::Delete, table, None, options)
            .await
    }

    /// Compile and execute any operation.
    pub async fn run(
        &self,
        connection_id: &str,
        operation: Operation,
        table: &TableDescriptor,
        entity: Option<&Entity>,
        options: Option<&QueryOptions>,
    ) -> DbResult<ResultSet> {
        let handle = self.registry.handle(connection_id).await?;
        let model = model_for(&handle, table);

        debug!(
            connection_id = %connection_id,
            model = %model.identity,
            operation = %operation,
            "Handling request"
        );

        let compiled =
            StatementCompiler::new(handle.dialect()).compile(operation, table, entity, options)?;
        self.executor.execute(&compiled, &model, &handle).await
    }
}

/// Registered model for the table, or one derived from the table itself.
fn model_for(handle: &ConnectionHandle, table: &TableDescriptor) -> ModelDescriptor {
    handle
        .model_for_table(&table.name)
        .cloned()
        .unwrap_or_else(|| ModelDescriptor::for_table(table.clone()))
}
