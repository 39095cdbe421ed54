//! Built-in tool providers and discovery

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::client::{McpProxyTool, McpServer};
use crate::tools::ToolHandler;

/// Tables the database provider may touch
pub const ERP_TABLES: [&str; 20] = [
    "accounts",
    "transactions",
    "financial_periods",
    "tax_rates",
    "currencies",
    "inventory",
    "products",
    "warehouses",
    "stock_movements",
    "purchase_orders",
    "customers",
    "sales_orders",
    "invoices",
    "payments",
    "shipping",
    "employees",
    "departments",
    "positions",
    "payroll",
    "attendance",
];

/// Aggregate and ERP functions the database provider may call
pub const ERP_FUNCTIONS: [&str; 8] = [
    "sum",
    "avg",
    "count",
    "min",
    "max",
    "calculate_inventory_value",
    "calculate_order_total",
    "get_account_balance",
];

#[derive(Clone, PartialEq)]
pub struct DatabaseSettings {
    pub connection_string: String,
    pub schema: String,
    pub max_results: u32,
    pub enable_write: bool,
    pub query_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            schema: "public".to_string(),
            max_results: 1000,
            enable_write: true,
            query_timeout_ms: 5000,
        }
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("connection_string", &"***")
            .field("schema", &self.schema)
            .field("max_results", &self.max_results)
            .field("enable_write", &self.enable_write)
            .field("query_timeout_ms", &self.query_timeout_ms)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.example.com/erp".to_string(),
            token: String::new(),
        }
    }
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// A named provider: how to launch it and the descriptor it is launched with
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub config: Value,
}

impl ProviderSpec {
    /// SQL access to the ERP backing store
    pub fn database(settings: &DatabaseSettings) -> Self {
        Self {
            name: "database".to_string(),
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-database".to_string(),
            ],
            config: json!({
                "connection_string": settings.connection_string,
                "allowed_tables": ERP_TABLES,
                "allowed_schemas": [settings.schema],
                "max_results": settings.max_results,
                "enable_write": settings.enable_write,
                "query_timeout_ms": settings.query_timeout_ms,
                "allowed_functions": ERP_FUNCTIONS,
            }),
        }
    }

    /// REST access to the ERP service
    pub fn api(settings: &ApiSettings) -> Self {
        Self {
            name: "api".to_string(),
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-api".to_string(),
            ],
            config: json!({
                "base_url": settings.base_url,
                "auth": {
                    "type": "bearer",
                    "token": settings.token,
                },
                "endpoints": [
                    {
                        "name": "getCustomerData",
                        "path": "/customers/{customer_id}",
                        "method": "GET",
                        "description": "Get customer information"
                    },
                    {
                        "name": "createOrder",
                        "path": "/orders",
                        "method": "POST",
                        "description": "Create a new order"
                    },
                    {
                        "name": "updateInventory",
                        "path": "/inventory/{item_id}",
                        "method": "PUT",
                        "description": "Update inventory levels"
                    },
                    {
                        "name": "processPayment",
                        "path": "/payments",
                        "method": "POST",
                        "description": "Process a payment"
                    },
                    {
                        "name": "generateInvoice",
                        "path": "/invoices",
                        "method": "POST",
                        "description": "Generate an invoice"
                    }
                ],
            }),
        }
    }

    pub fn config_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_config.json", self.name))
    }

    /// Write the descriptor as pretty JSON and return its path
    pub fn write_config(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = self.config_path(dir);
        let body = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Full argument list: base args followed by the descriptor path
    pub fn launch_args(&self, config_path: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(config_path.display().to_string());
        args
    }

    async fn connect(&self, config_dir: &Path) -> Result<Vec<Arc<dyn ToolHandler>>> {
        let path = self.write_config(config_dir)?;
        let server = McpServer::spawn(&self.name, &self.command, &self.launch_args(&path)).await?;
        let tools = server.list_tools().await?;
        Ok(tools
            .into_iter()
            .map(|def| Arc::new(McpProxyTool::new(server.clone(), def)) as Arc<dyn ToolHandler>)
            .collect())
    }
}

/// Launch every provider and collect its tools.
///
/// A provider that fails to launch, handshake, or list within the startup
/// timeout contributes no tools; discovery itself never fails.
pub async fn discover_tools(
    specs: &[ProviderSpec],
    config_dir: &Path,
    startup_timeout: Duration,
) -> Vec<Arc<dyn ToolHandler>> {
    let mut discovered = Vec::new();
    for spec in specs {
        match tokio::time::timeout(startup_timeout, spec.connect(config_dir)).await {
            Ok(Ok(tools)) => {
                info!("Provider '{}' contributed {} tools", spec.name, tools.len());
                discovered.extend(tools);
            }
            Ok(Err(e)) => warn!("Provider '{}' unavailable: {:#}", spec.name, e),
            Err(_) => warn!(
                "Provider '{}' did not start within {}s",
                spec.name,
                startup_timeout.as_secs()
            ),
        }
    }
    discovered
}
