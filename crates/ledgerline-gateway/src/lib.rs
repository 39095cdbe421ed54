//! ledgerline-gateway - HTTP and WebSocket front door for the ERP chat
//!
//! Each browser tab connects to `/ws/{session_id}`, sends `{"message": ...}`
//! frames, and receives a thinking notice followed by the reply. Transcripts
//! are kept per session for the life of the process and can be fetched from
//! `/chat_history/{session_id}`.

pub mod connections;
pub mod protocol;
pub mod server;
pub mod session;
pub mod webchat;

pub use server::GatewayServer;
