//! Connection registry.
//!
//! Maps a connection identity to its live [`ConnectionHandle`]. At most one
//! handle exists per identity; insertion and removal go through a single
//! `RwLock`, while connecting and closing happen outside of it. An identity is
//! reserved under the lock before connecting, so a duplicate registration is
//! rejected before any transport work.

use crate::db::connection::{ConnectionHandle, DbConnection};
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, ConnectionInfo, ModelDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
enum Slot {
    /// Reserved by a registration that is still connecting.
    Pending,
    Live(Arc<ConnectionHandle>),
}

impl Slot {
    fn live(&self) -> Option<&Arc<ConnectionHandle>> {
        match self {
            Slot::Live(handle) => Some(handle),
            Slot::Pending => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    slots: Arc<RwLock<HashMap<String, Slot>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect and register `config` together with the models it serves.
    ///
    /// Fails without connecting when the identity is already registered or
    /// another registration for it is in progress.
    pub async fn register(
        &self,
        config: ConnectionConfig,
        models: Vec<ModelDescriptor>,
    ) -> DbResult<ConnectionInfo> {
        let connection_id = config.id.clone();
        if connection_id.is_empty() {
            return Err(DbError::configuration("Connection is missing an identity"));
        }

        {
            let mut slots = self.slots.write().await;
            if slots.contains_key(&connection_id) {
                return Err(already_registered(&connection_id));
            }
            slots.insert(connection_id.clone(), Slot::Pending);
        }

        info!(
            connection_id = %connection_id,
            db_type = %config.db_type,
            url = %config.masked_connection_string(),
            "Connecting to database"
        );

        let mut connection = match DbConnection::connect(&config).await {
            Ok(connection) => connection,
            Err(e) => {
                self.slots.write().await.remove(&connection_id);
                return Err(e);
            }
        };
        let server_version = connection.server_version().await;
        let handle = Arc::new(ConnectionHandle::new(
            connection_id.clone(),
            connection,
            server_version.clone(),
            models,
        ));
        let info = ConnectionInfo {
            connection_id: connection_id.clone(),
            database_type: config.db_type,
            server_version,
            models: handle.model_identities(),
        };

        self.slots
            .write()
            .await
            .insert(connection_id.clone(), Slot::Live(handle));

        info!(
            connection_id = %connection_id,
            server_version = ?info.server_version,
            models = info.models.len(),
            "Connected successfully"
        );
        Ok(info)
    }

    /// Close and forget one identity, or every identity when `id` is `None`.
    ///
    /// Tearing down an unknown identity is a no-op. Close failures are logged;
    /// the identity is removed regardless. Registrations still connecting keep
    /// their reservation.
    pub async fn teardown(&self, id: Option<&str>) -> DbResult<()> {
        let removed: Vec<Arc<ConnectionHandle>> = {
            let mut slots = self.slots.write().await;
            match id {
                Some(id) => match slots.get(id) {
                    Some(Slot::Live(_)) => slots
                        .remove(id)
                        .and_then(|slot| slot.live().cloned())
                        .into_iter()
                        .collect(),
                    _ => Vec::new(),
                },
                None => {
                    let live: Vec<String> = slots
                        .iter()
                        .filter(|(_, slot)| slot.live().is_some())
                        .map(|(id, _)| id.clone())
                        .collect();
                    live.iter()
                        .filter_map(|id| slots.remove(id))
                        .filter_map(|slot| slot.live().cloned())
                        .collect()
                }
            }
        };

        if removed.is_empty() {
            debug!(connection_id = ?id, "Nothing to tear down");
        }

        for handle in removed {
            info!(connection_id = %handle.id(), "Closing connection");
            if let Err(e) = handle.close().await {
                warn!(connection_id = %handle.id(), error = %e, "Error while closing connection");
            }
        }
        Ok(())
    }

    /// Live handle for `id`.
    pub async fn handle(&self, id: &str) -> DbResult<Arc<ConnectionHandle>> {
        let slots = self.slots.read().await;
        slots
            .get(id)
            .and_then(Slot::live)
            .cloned()
            .ok_or_else(|| DbError::connection_not_found(id))
    }

    /// Live handle for `id` together with the registered model `identity`.
    pub async fn model(
        &self,
        id: &str,
        identity: &str,
    ) -> DbResult<(Arc<ConnectionHandle>, ModelDescriptor)> {
        let handle = self.handle(id).await?;
        let model = handle.model(identity).cloned().ok_or_else(|| {
            DbError::invalid_input(format!(
                "Model '{}' is not registered on connection '{}'",
                identity, id
            ))
        })?;
        Ok((handle, model))
    }

    pub async fn exists(&self, id: &str) -> bool {
        self.slots
            .read()
            .await
            .get(id)
            .is_some_and(|slot| slot.live().is_some())
    }

    /// Registered identities, sorted.
    pub async fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .slots
            .read()
            .await
            .iter()
            .filter(|(_, slot)| slot.live().is_some())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.live().is_some())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn already_registered(connection_id: &str) -> DbError {
    DbError::configuration(format!(
        "Connection '{}' is already registered",
        connection_id
    ))
}
