//! External tool discovery over the Model Context Protocol
//!
//! Providers are launched as child processes speaking newline-delimited
//! JSON-RPC on stdio. Every tool a provider lists becomes an
//! [`McpProxyTool`] the coordinator can call.

pub mod client;
pub mod provider;

pub use client::{McpProxyTool, McpServer, McpToolDefinition};
pub use provider::{ApiSettings, DatabaseSettings, ProviderSpec, discover_tools};
