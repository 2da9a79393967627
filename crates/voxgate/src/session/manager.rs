use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{GatewayError, GatewayResult};
use crate::utils::time::{now_rfc3339, now_secs};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    pub connected_at: String,
    pub messages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<u64>,
}

/// Tracks live websocket connections. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    active: Arc<Mutex<HashMap<String, ConnectionInfo>>>,
}

/// Registration of one connection. Dropping it removes the connection from the registry,
/// including when the connection task unwinds.
#[derive(Debug)]
pub struct ConnectionGuard {
    manager: ConnectionManager,
    id: String,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, peer: Option<SocketAddr>) -> GatewayResult<ConnectionGuard> {
        let id = uuid::Uuid::new_v4().to_string();
        let info = ConnectionInfo {
            id: id.clone(),
            peer: peer.map(|addr| addr.to_string()),
            connected_at: now_rfc3339(),
            messages: 0,
            last_message_at: None,
        };
        self.lock()?.insert(id.clone(), info);
        Ok(ConnectionGuard {
            manager: self.clone(),
            id,
        })
    }

    pub fn unregister(&self, id: &str) -> GatewayResult<Option<ConnectionInfo>> {
        Ok(self.lock()?.remove(id))
    }

    pub fn record_message(&self, id: &str) -> GatewayResult<()> {
        if let Some(info) = self.lock()?.get_mut(id) {
            info.messages += 1;
            info.last_message_at = Some(now_secs());
        }
        Ok(())
    }

    pub fn active_count(&self) -> GatewayResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Live connections, oldest first.
    pub fn list(&self) -> GatewayResult<Vec<ConnectionInfo>> {
        let mut connections: Vec<ConnectionInfo> = self.lock()?.values().cloned().collect();
        connections.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));
        Ok(connections)
    }

    fn lock(&self) -> GatewayResult<MutexGuard<'_, HashMap<String, ConnectionInfo>>> {
        self.active
            .lock()
            .map_err(|_| GatewayError::Internal("connection registry lock poisoned".to_string()))
    }
}

impl ConnectionGuard {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record_message(&self) {
        if let Err(error) = self.manager.record_message(&self.id) {
            tracing::warn!("connection {}: {error}", self.id);
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Err(error) = self.manager.unregister(&self.id) {
            tracing::warn!("connection {}: {error}", self.id);
        }
    }
}
