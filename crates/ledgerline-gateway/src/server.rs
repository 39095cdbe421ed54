//! Gateway server: axum HTTP routes plus the per-session chat WebSocket

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use ledgerline_core::Coordinator;
use serde::Serialize;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::connections::ConnectionRegistry;
use crate::protocol::{ChatEntry, HistoryResponse, InboundFrame, ThinkingFrame};
use crate::session::SessionStore;

/// Shared state for all routes
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: SessionStore,
    pub connections: ConnectionRegistry,
    pub coordinator: Arc<Coordinator>,
    pub start_time: std::time::Instant,
}

pub struct GatewayServer {
    state: GatewayState,
    bind: SocketAddr,
}

impl GatewayServer {
    pub fn new(bind: SocketAddr, coordinator: Arc<Coordinator>) -> Self {
        let state = GatewayState {
            sessions: SessionStore::new(),
            connections: ConnectionRegistry::new(),
            coordinator,
            start_time: std::time::Instant::now(),
        };
        Self { state, bind }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.state.sessions
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws/{session_id}", get(ws_handler))
            .route("/chat_history/{session_id}", get(history_handler))
            .route("/api/status", get(status_handler))
            .route("/", get(crate::webchat::index_handler))
            .route("/assets/{*path}", get(crate::webchat::static_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("Gateway listening on http://{}", self.bind);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Gateway stopped");
        Ok(())
    }
}

// ── HTTP Handlers ──

async fn status_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.count().await,
        "connected_clients": state.connections.count().await,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn history_handler(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let messages = state.sessions.history(&session_id).await;
    debug!("History for '{}': {} entries", session_id, messages.len());
    axum::Json(HistoryResponse { messages })
}

// ── WebSocket Handler ──

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state, session_id))
}

async fn handle_ws(socket: WebSocket, state: GatewayState, session_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let conn_id = state.connections.register(&session_id, tx).await;
    let prior = state.sessions.open(&session_id).await;
    info!("Session '{}' connected ({} prior entries)", session_id, prior);

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Turns run one at a time per socket
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => process_turn(&state, &session_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket error on session '{}': {}", session_id, e);
                break;
            }
        }
    }

    state.connections.deregister(&session_id, &conn_id).await;
    send_task.abort();
    info!("Session '{}' disconnected", session_id);
}

/// Handle one inbound frame: record, acknowledge, delegate, record the reply
async fn process_turn(state: &GatewayState, session_id: &str, raw: &str) {
    let frame: InboundFrame = match serde_json::from_str(raw) {
        Ok(f) => f,
        Err(e) => {
            warn!("Invalid frame on session '{}': {}", session_id, e);
            let notice = ChatEntry::system(format!("Invalid message format: {}", e));
            send_frame(state, session_id, &notice).await;
            return;
        }
    };

    state
        .sessions
        .append(session_id, ChatEntry::user(frame.message.clone()))
        .await;
    send_frame(state, session_id, &ThinkingFrame::new()).await;

    let reply = match state.coordinator.handle(&frame.message).await {
        Ok(text) => ChatEntry::assistant(text),
        Err(e) => {
            error!("Turn failed on session '{}': {:#}", session_id, e);
            ChatEntry::system(format!("Error processing request: {}", e))
        }
    };

    state.sessions.append(session_id, reply.clone()).await;
    send_frame(state, session_id, &reply).await;
}

async fn send_frame<T: Serialize>(state: &GatewayState, session_id: &str, frame: &T) {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize frame: {}", e);
            return;
        }
    };
    if !state.connections.send(session_id, json).await {
        debug!("No live socket for session '{}', frame dropped", session_id);
    }
}
