//! Agent profile: an agent's identity, instructions, tools, and guardrails

use std::sync::Arc;

use crate::guardrails::{Guardrail, GuardrailSet};
use crate::prompt::build_system_prompt;
use crate::tools::{ToolHandler, ToolRegistry};

/// Static configuration bundle for one agent.
///
/// Profiles are built once at startup and shared read-only across sessions.
#[derive(Debug)]
pub struct AgentProfile {
    /// Stable identifier, also the tool name when the agent is delegated to
    pub id: String,
    /// Display name used in prompts and refusals
    pub name: String,
    /// One-line summary advertised to a delegating agent
    pub summary: String,
    pub instructions: String,
    pub tools: ToolRegistry,
    pub guardrails: GuardrailSet,
}

impl AgentProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            summary: String::new(),
            instructions: String::new(),
            tools: ToolRegistry::new(),
            guardrails: GuardrailSet::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn ToolHandler>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn with_guardrail(mut self, guardrail: impl Guardrail + 'static) -> Self {
        self.guardrails = self.guardrails.with(guardrail);
        self
    }

    /// Drop every guardrail (used when guardrails are switched off in config)
    pub fn without_guardrails(mut self) -> Self {
        self.guardrails = GuardrailSet::new();
        self
    }

    /// System prompt for a fresh run of this agent
    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.name, &self.instructions)
    }
}
