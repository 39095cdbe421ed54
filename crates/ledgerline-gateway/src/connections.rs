//! Live connection registry: which socket currently serves each session

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

/// Outbound frame queue for one socket
pub type FrameSender = mpsc::UnboundedSender<String>;

struct Connection {
    conn_id: String,
    sender: FrameSender,
}

/// Maps session id to the most recent live connection.
///
/// A reconnect replaces the previous entry; the stale socket's deregister
/// leaves the new one alone because the connection ids differ.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<String, Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket for a session and return its connection id
    pub async fn register(&self, session_id: &str, sender: FrameSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();
        let mut map = self.inner.write().await;
        if map.contains_key(session_id) {
            debug!("Session '{}' reconnected, replacing old socket", session_id);
        }
        map.insert(
            session_id.to_string(),
            Connection {
                conn_id: conn_id.clone(),
                sender,
            },
        );
        conn_id
    }

    /// Remove the session's entry only if it still belongs to `conn_id`
    pub async fn deregister(&self, session_id: &str, conn_id: &str) -> bool {
        let mut map = self.inner.write().await;
        let owned = map
            .get(session_id)
            .map(|c| c.conn_id == conn_id)
            .unwrap_or(false);
        if owned {
            map.remove(session_id);
            debug!("Deregistered connection for session '{}'", session_id);
        }
        owned
    }

    /// Queue a frame for the session's live socket; false if none is connected
    pub async fn send(&self, session_id: &str, frame: String) -> bool {
        match self.inner.read().await.get(session_id) {
            Some(conn) => conn.sender.send(frame).is_ok(),
            None => false,
        }
    }

    /// Number of sessions with a live socket
    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }
}
