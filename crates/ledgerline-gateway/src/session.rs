//! Session store: one append-only transcript per session id

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::protocol::ChatEntry;

/// A chat session and its transcript
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub messages: Vec<ChatEntry>,
}

impl Session {
    fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            created_at: now,
            last_activity: now,
            messages: Vec::new(),
        }
    }
}

/// In-memory session store.
///
/// Sessions are created on first contact and kept for the life of the
/// process. Entries are only ever appended.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session if it does not exist yet; returns its entry count
    pub async fn open(&self, session_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(session_id.to_string()).or_insert_with(|| {
            info!("Created session '{}'", session_id);
            Session::new(session_id)
        });
        session.messages.len()
    }

    /// Append an entry, creating the session if needed
    pub async fn append(&self, session_id: &str, entry: ChatEntry) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        session.last_activity = Utc::now();
        session.messages.push(entry);
        debug!(
            "Session '{}' now has {} entries",
            session_id,
            session.messages.len()
        );
    }

    /// Snapshot of a transcript; empty for unknown sessions
    pub async fn history(&self, session_id: &str) -> Vec<ChatEntry> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// Number of known sessions
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
