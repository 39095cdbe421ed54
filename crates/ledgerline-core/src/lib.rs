//! ledgerline-core - agents, tools, and guardrails behind the ERP chat
//!
//! This crate provides:
//! - Mock ERP records, sample data, and the domain functions agents call
//! - Tool system with one handler per domain function
//! - Deny-list guardrails evaluated before any agent acts
//! - Finance, inventory, sales, and HR agents plus the coordinator that delegates to them
//! - Anthropic API client implementing the reasoning runtime tool loop
//! - External tool discovery over MCP stdio providers

pub mod agents;
pub mod api;
pub mod coordinator;
pub mod erp;
pub mod guardrails;
pub mod mcp;
pub mod prompt;
pub mod runtime;
pub mod tools;

// Re-export main types for convenience
pub use agents::{AgentProfile, AgentTool};
pub use api::{ApiClient, ContentBlock, ToolDefinition};
pub use coordinator::Coordinator;
pub use erp::{DomainError, DomainResult};
pub use guardrails::{DenyListGuardrail, Guardrail, GuardrailKind, GuardrailOutcome, GuardrailSet};
pub use mcp::{ApiSettings, DatabaseSettings, ProviderSpec, discover_tools};
pub use prompt::build_system_prompt;
pub use runtime::ReasoningRuntime;
pub use tools::{ToolExecutor, ToolHandler, ToolRegistry};
