//! Reasoning runtime seam
//!
//! Agents never talk to a model directly. They hand a system prompt, a tool
//! executor and the user's text to a [`ReasoningRuntime`], which decides which
//! tools to call and returns the final answer text.

use anyhow::Result;
use async_trait::async_trait;

use crate::tools::ToolExecutor;

#[async_trait]
pub trait ReasoningRuntime: Send + Sync {
    /// Run one request to completion and return the final output text
    async fn run(&self, system: &str, tools: &dyn ToolExecutor, input: &str) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted runtime used by unit tests in place of a hosted model

    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Calls the first planned tool that the executor advertises, then echoes
    /// its output as the answer. With no matching tool it answers with the
    /// input text.
    pub struct ScriptedRuntime {
        plan: Vec<(String, Value)>,
        pub calls: Mutex<Vec<String>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedRuntime {
        pub fn new() -> Self {
            Self {
                plan: Vec::new(),
                calls: Mutex::new(Vec::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calling(mut self, tool: &str, input: Value) -> Self {
            self.plan.push((tool.to_string(), input));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReasoningRuntime for ScriptedRuntime {
        async fn run(&self, system: &str, tools: &dyn ToolExecutor, input: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(system.to_string());
            let listed: Vec<String> = tools.list_tools().into_iter().map(|t| t.name).collect();
            let step = self.plan.iter().find(|(name, _)| listed.contains(name));
            match step {
                Some((name, args)) => {
                    self.calls.lock().unwrap().push(name.clone());
                    tools.execute(name, args.clone()).await
                }
                None => Ok(format!("echo: {}", input)),
            }
        }
    }

    /// Runtime that always fails
    pub struct FailingRuntime;

    #[async_trait]
    impl ReasoningRuntime for FailingRuntime {
        async fn run(&self, _system: &str, _tools: &dyn ToolExecutor, _input: &str) -> Result<String> {
            Err(anyhow::anyhow!("model unavailable"))
        }
    }
}
