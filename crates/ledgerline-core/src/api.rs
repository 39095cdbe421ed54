//! Anthropic Messages API client with tool use loop

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::runtime::ReasoningRuntime;
use crate::tools::ToolExecutor;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const MAX_ITERATIONS: usize = 10;
const MAX_TOOL_OUTPUT: usize = 100_000;

/// Anthropic API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &mask_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Keep the first three and last four characters of a key
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 7 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

impl ApiClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: 4096,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set a custom base URL (e.g. for proxies)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Make a single request to the Messages API
    pub async fn chat(
        &self,
        messages: &[ApiMessage],
        tools: &[ToolDefinition],
        system: &str,
    ) -> Result<ApiResponse> {
        let url = format!("{}/v1/messages", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": messages,
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
        }

        debug!("Sending request to Anthropic API with {} messages", messages.len());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse API response")?;

        debug!(
            "Received response with {} content blocks, stop_reason: {:?}",
            api_response.content.len(),
            api_response.stop_reason
        );

        Ok(api_response)
    }

    /// Run the tool use loop until the model ends its turn
    pub async fn run_tool_loop(
        &self,
        initial_message: &str,
        system: &str,
        tool_executor: &dyn ToolExecutor,
    ) -> Result<String> {
        let tools = tool_executor.list_tools();
        let mut conversation: Vec<ApiMessage> = vec![ApiMessage {
            role: "user".to_string(),
            content: MessageContent::Text(initial_message.to_string()),
        }];
        let mut input_tokens = 0u64;
        let mut output_tokens = 0u64;

        for iteration in 1..=MAX_ITERATIONS {
            info!("Tool loop iteration {}", iteration);

            let response = self.chat(&conversation, &tools, system).await?;
            input_tokens += u64::from(response.usage.input_tokens);
            output_tokens += u64::from(response.usage.output_tokens);

            conversation.push(ApiMessage {
                role: "assistant".to_string(),
                content: MessageContent::Blocks(response.content.clone()),
            });

            match response.stop_reason.as_deref() {
                Some("tool_use") => {
                    let tool_results = execute_tool_calls(&response.content, tool_executor).await;
                    if tool_results.is_empty() {
                        return Err(anyhow!("Stop reason was tool_use but no tool calls found"));
                    }
                    conversation.push(ApiMessage {
                        role: "user".to_string(),
                        content: MessageContent::Blocks(tool_results),
                    });
                }
                Some("end_turn") | Some("stop_sequence") | None => {
                    debug!(
                        "Tool loop completed (iterations: {}, tokens: in={} out={})",
                        iteration, input_tokens, output_tokens
                    );
                    return final_text(&response.content)
                        .ok_or_else(|| anyhow!("No text response from assistant"));
                }
                Some(other) => {
                    warn!("Unexpected stop_reason: {}", other);
                    return Err(anyhow!("Unexpected stop_reason: {}", other));
                }
            }
        }

        warn!("Tool loop exceeded maximum iterations ({})", MAX_ITERATIONS);
        Err(anyhow!("Tool loop exceeded maximum iterations"))
    }
}

#[async_trait]
impl ReasoningRuntime for ApiClient {
    async fn run(&self, system: &str, tools: &dyn ToolExecutor, input: &str) -> Result<String> {
        self.run_tool_loop(input, system, tools).await
    }
}

/// Execute every tool_use block, turning failures into error text for the model
async fn execute_tool_calls(
    content: &[ContentBlock],
    tool_executor: &dyn ToolExecutor,
) -> Vec<ContentBlock> {
    let mut results = Vec::new();
    for block in content {
        if let ContentBlock::ToolUse { id, name, input } = block {
            info!("Executing tool: {}", name);
            let (output, is_error) = match tool_executor.execute(name, input.clone()).await {
                Ok(output) => (output, None),
                Err(e) => {
                    warn!("Tool {} failed: {}", name, e);
                    (format!("Error: {}", e), Some(true))
                }
            };
            results.push(ContentBlock::ToolResult {
                tool_use_id: id.clone(),
                content: truncate_output(output),
                is_error,
            });
        }
    }
    results
}

fn truncate_output(mut output: String) -> String {
    if output.len() > MAX_TOOL_OUTPUT {
        let mut cut = MAX_TOOL_OUTPUT;
        while !output.is_char_boundary(cut) {
            cut -= 1;
        }
        output.truncate(cut);
        output.push_str("\n[Output truncated]");
    }
    output
}

fn final_text(content: &[ContentBlock]) -> Option<String> {
    let texts: Vec<&str> = content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

/// Message in conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Content of a message (plain text or structured blocks)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Tool descriptor advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use crate::tools::erp::CheckInventoryLevelsTool;
    use std::sync::Arc;

    #[test]
    fn test_api_client_defaults() {
        let client = ApiClient::new("test-key".to_string(), None);
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.max_tokens, 4096);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("k".to_string(), Some("m".to_string()))
            .with_base_url("http://localhost:9000/".to_string());
        assert_eq!(client.base_url, "http://localhost:9000");
        assert_eq!(client.model(), "m");
    }

    #[test]
    fn test_debug_masks_key() {
        let client = ApiClient::new("sk-ant-1234567890abcdef".to_string(), None);
        let debug_output = format!("{:?}", client);
        assert!(debug_output.contains("sk-...cdef"));
        assert!(!debug_output.contains("sk-ant-1234567890abcdef"));
    }

    #[test]
    fn test_debug_masks_short_key() {
        let client = ApiClient::new("short".to_string(), None);
        let debug_output = format!("{:?}", client);
        assert!(debug_output.contains("***"));
        assert!(!debug_output.contains("short"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "(empty)");
        assert_eq!(mask_key("short"), "***");
        assert_eq!(mask_key("sk-ant-abcdefgh"), "sk-...efgh");
        assert_eq!(mask_key("ééé-secret-ñ"), "ééé...et-ñ");
    }

    #[test]
    fn test_parse_tool_use_response() {
        let raw = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "Checking"},
                {"type": "tool_use", "id": "tu_1", "name": "check_inventory_levels", "input": {"item_id": "ITM001"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let response: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(final_text(&response.content).as_deref(), Some("Checking"));
    }

    #[tokio::test]
    async fn test_execute_tool_calls() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CheckInventoryLevelsTool));
        let content = vec![
            ContentBlock::ToolUse {
                id: "a".to_string(),
                name: "check_inventory_levels".to_string(),
                input: serde_json::json!({"item_id": "ITM002"}),
            },
            ContentBlock::ToolUse {
                id: "b".to_string(),
                name: "wire_money".to_string(),
                input: serde_json::json!({}),
            },
        ];
        let results = execute_tool_calls(&content, &registry).await;
        assert_eq!(results.len(), 2);
        match &results[0] {
            ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                assert_eq!(tool_use_id, "a");
                assert!(content.contains("Mouse"));
                assert_eq!(*is_error, None);
            }
            other => panic!("unexpected block {:?}", other),
        }
        match &results[1] {
            ContentBlock::ToolResult { content, is_error, .. } => {
                assert_eq!(content, "Error: Unknown tool: wire_money");
                assert_eq!(*is_error, Some(true));
            }
            other => panic!("unexpected block {:?}", other),
        }

        let wire = serde_json::to_value(&results).unwrap();
        assert!(wire[0].get("is_error").is_none());
        assert_eq!(wire[1]["is_error"], true);
    }

    #[test]
    fn test_truncate_output_respects_char_boundary() {
        let long = "é".repeat(MAX_TOOL_OUTPUT);
        let cut = truncate_output(long);
        assert!(cut.ends_with("[Output truncated]"));
        assert!(cut.len() <= MAX_TOOL_OUTPUT + 20);

        assert_eq!(truncate_output("short".to_string()), "short");
    }

    #[test]
    fn test_final_text_joins_blocks() {
        let content = vec![
            ContentBlock::Text { text: "one".to_string() },
            ContentBlock::Text { text: "two".to_string() },
        ];
        assert_eq!(final_text(&content).as_deref(), Some("one\ntwo"));
        assert_eq!(final_text(&[]), None);
    }
}
