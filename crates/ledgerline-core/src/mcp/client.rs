//! MCP stdio client

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::tools::ToolHandler;

const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Tool as listed by a provider
#[derive(Debug, Clone, Deserialize)]
pub struct McpToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

struct McpIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// A running provider process. Killed when the last handle is dropped.
pub struct McpServer {
    name: String,
    _child: Child,
    io: Mutex<McpIo>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("name", &self.name).finish()
    }
}

impl McpServer {
    /// Launch the provider and complete the initialize handshake
    pub async fn spawn(name: &str, command: &str, args: &[String]) -> Result<Arc<Self>> {
        info!("Launching tool provider '{}' via {} {:?}", name, command, args);

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to launch tool provider '{}'", name))?;

        let stdin = child.stdin.take().context("Provider stdin unavailable")?;
        let stdout = child.stdout.take().context("Provider stdout unavailable")?;

        let server = Arc::new(Self {
            name: name.to_string(),
            _child: child,
            io: Mutex::new(McpIo {
                stdin,
                stdout: BufReader::new(stdout),
            }),
            next_id: AtomicU64::new(1),
        });

        server.initialize().await?;
        Ok(server)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn send_line(io: &mut McpIo, line: String) -> Result<()> {
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.write_all(b"\n").await?;
        io.stdin.flush().await?;
        Ok(())
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = serde_json::to_string(&JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        })?;
        debug!("MCP request to {}: {}", self.name, request);

        let mut io = self.io.lock().await;
        Self::send_line(&mut io, request).await?;

        // Skip notifications and anything not addressed to this request
        loop {
            let mut line = String::new();
            let read = io.stdout.read_line(&mut line).await?;
            if read == 0 {
                return Err(anyhow!("Tool provider '{}' closed its output", self.name));
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!("MCP response from {}: {}", self.name, line);

            let response: JsonRpcResponse = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(_) => continue,
            };
            if response.id.as_ref().and_then(Value::as_u64) != Some(id) {
                continue;
            }
            if let Some(error) = response.error {
                return Err(anyhow!("MCP error: {} (code {})", error.message, error.code));
            }
            return response
                .result
                .context("MCP response missing result and error");
        }
    }

    async fn initialize(&self) -> Result<()> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "ledgerline",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        self.call("initialize", Some(params)).await?;

        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });
        let mut io = self.io.lock().await;
        Self::send_line(&mut io, notification.to_string()).await
    }

    pub async fn list_tools(&self) -> Result<Vec<McpToolDefinition>> {
        let result = self.call("tools/list", None).await?;
        let tools = result.get("tools").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(tools).context("Invalid tools/list result")
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let params = json!({
            "name": name,
            "arguments": arguments
        });
        self.call("tools/call", Some(params)).await
    }
}

/// Proxies one provider tool into the local tool registry as `<provider>__<tool>`
pub struct McpProxyTool {
    server: Arc<McpServer>,
    definition: McpToolDefinition,
    qualified_name: String,
    description: String,
}

impl McpProxyTool {
    pub fn new(server: Arc<McpServer>, definition: McpToolDefinition) -> Self {
        let qualified_name = format!("{}__{}", server.name(), definition.name);
        let description = definition
            .description
            .clone()
            .unwrap_or_else(|| format!("Tool from the {} provider", server.name()));
        Self {
            server,
            definition,
            qualified_name,
            description,
        }
    }
}

#[async_trait]
impl ToolHandler for McpProxyTool {
    fn name(&self) -> &str {
        &self.qualified_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.definition.input_schema.clone()
    }

    async fn execute(&self, input: Value) -> Result<String> {
        debug!("Calling provider tool {}", self.qualified_name);
        let result = self.server.call_tool(&self.definition.name, input).await?;
        let text = content_text(&result);
        if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
            return Err(anyhow!(text));
        }
        Ok(text)
    }
}

/// Join the text blocks of a tools/call result
fn content_text(result: &Value) -> String {
    result
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_text() {
        let result = json!({"content": [
            {"type": "text", "text": "a"},
            {"type": "image", "data": "..."},
            {"type": "text", "text": "b"}
        ]});
        assert_eq!(content_text(&result), "a\nb");
        assert_eq!(content_text(&json!({})), "");
    }

    #[test]
    fn test_definition_defaults() {
        let def: McpToolDefinition = serde_json::from_str(r#"{"name": "query"}"#).unwrap();
        assert!(def.description.is_none());
        assert_eq!(def.input_schema["type"], "object");
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let result = McpServer::spawn("ghost", "ledgerline-no-such-provider", &[]).await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handshake_list_and_call() {
        let script = r#"
while IFS= read -r line; do
  case "$line" in
    *'"initialize"'*) echo '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","capabilities":{}}}' ;;
    *'"tools/list"'*) echo '{"jsonrpc":"2.0","method":"notifications/progress"}'; echo '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"query","description":"Run a query","inputSchema":{"type":"object"}}]}}' ;;
    *'"tools/call"'*) echo '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"2 rows"}]}}' ;;
  esac
done
"#;
        let server = McpServer::spawn("database", "sh", &["-c".to_string(), script.to_string()])
            .await
            .unwrap();
        let tools = server.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);

        let proxy = McpProxyTool::new(server.clone(), tools[0].clone());
        assert_eq!(proxy.name(), "database__query");
        assert_eq!(proxy.description(), "Run a query");

        let out = proxy.execute(json!({"sql": "select 1"})).await.unwrap();
        assert_eq!(out, "2 rows");
    }
}
