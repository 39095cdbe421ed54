use anyhow::{Context, Result, bail};
use ledgerline_core::api::mask_key;
use ledgerline_core::{ApiSettings, DatabaseSettings, ProviderSpec};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerlineConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub backing_store: BackingStoreConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub guardrails: GuardrailsConfig,
    #[serde(default)]
    pub mcp: McpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    ledgerline_core::api::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub anthropic: AnthropicConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &mask_key(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_base_url() -> String {
    ledgerline_core::api::DEFAULT_BASE_URL.to_string()
}

/// Where the ERP data lives. Only handed to the database tool provider.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BackingStoreConfig {
    #[serde(default)]
    pub connection_string: String,
}

impl std::fmt::Debug for BackingStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackingStoreConfig")
            .field("connection_string", &mask_key(&self.connection_string))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,
    #[serde(default)]
    pub database: DatabaseProviderConfig,
    #[serde(default)]
    pub api: ApiProviderConfig,
}

fn default_startup_timeout() -> u64 {
    30
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            startup_timeout_secs: default_startup_timeout(),
            database: DatabaseProviderConfig::default(),
            api: ApiProviderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseProviderConfig {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_true")]
    pub enable_write: bool,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_max_results() -> u32 {
    1000
}

fn default_query_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseProviderConfig {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            max_results: default_max_results(),
            enable_write: true,
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ApiProviderConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for ApiProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiProviderConfig")
            .field("base_url", &self.base_url)
            .field("token", &mask_key(&self.token))
            .finish()
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ledgerline")
}

impl LedgerlineConfig {
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path
            .clone()
            .unwrap_or_else(|| config_dir().join("config.toml"));

        // Refuse group/world readable configs, they may hold secrets
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = std::fs::metadata(&path) {
                let mode = metadata.permissions().mode();
                if mode & 0o077 != 0 {
                    bail!(
                        "Config file {:?} has overly permissive permissions ({:o}). \
                         It may contain secrets. Fix with: chmod 600 {:?}",
                        path,
                        mode & 0o777,
                        path
                    );
                }
            }
        }

        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read config at {}. Run `ledgerline init` first.",
                path.display()
            )
        })?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        if config.providers.anthropic.api_key.starts_with("sk-ant-") {
            warn!(
                "API key is hardcoded in config file. For security, use environment variables: api_key = \"${{ANTHROPIC_API_KEY}}\""
            );
        }

        Ok(config)
    }

    /// Expand allowlisted environment variables, then parse TOML
    pub fn parse(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Fail when a required credential is missing or was left unexpanded
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if is_unset(&self.providers.anthropic.api_key) {
            missing.push("ANTHROPIC_API_KEY");
        }
        if is_unset(&self.backing_store.connection_string) {
            missing.push("ERP_DB_CONNECTION");
        }
        if !missing.is_empty() {
            bail!(
                "Missing required environment variables: {}. Set them in the environment or a .env file.",
                missing.join(", ")
            );
        }
        Ok(())
    }

    pub fn gateway_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.gateway.bind, self.gateway.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid gateway address {}:{}",
                    self.gateway.bind, self.gateway.port
                )
            })
    }

    pub fn database_settings(&self) -> DatabaseSettings {
        let db = &self.mcp.database;
        DatabaseSettings {
            connection_string: self.backing_store.connection_string.clone(),
            schema: db.schema.clone(),
            max_results: db.max_results,
            enable_write: db.enable_write,
            query_timeout_ms: db.query_timeout_ms,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        let mut settings = ApiSettings::default();
        if !is_unset(&self.mcp.api.token) {
            settings.token = self.mcp.api.token.clone();
        }
        if !is_unset(&self.mcp.api.base_url) {
            settings.base_url = self.mcp.api.base_url.clone();
        }
        settings
    }

    /// The tool providers to launch at startup
    pub fn provider_specs(&self) -> Vec<ProviderSpec> {
        if !self.mcp.enabled {
            return Vec::new();
        }
        vec![
            ProviderSpec::database(&self.database_settings()),
            ProviderSpec::api(&self.api_settings()),
        ]
    }

    /// Copy with every secret masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.providers.anthropic.api_key = mask_key(&copy.providers.anthropic.api_key);
        copy.backing_store.connection_string = mask_key(&copy.backing_store.connection_string);
        copy.mcp.api.token = mask_key(&copy.mcp.api.token);
        copy
    }
}

/// Empty or still holding an unexpanded `${VAR}`
pub fn is_unset(value: &str) -> bool {
    value.trim().is_empty() || value.contains("${")
}

/// Write the default config to `path` with owner-only permissions
pub fn write_default(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Environment variables that may be expanded in config files
const ALLOWED_ENV_VARS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "ERP_DB_CONNECTION",
    "ERP_API_URL",
    "ERP_API_TOKEN",
    "HOME",
    "USER",
];

fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while let Some(start) = result[pos..].find("${") {
        let abs_start = pos + start;
        let Some(end) = result[abs_start..].find('}') else {
            break;
        };
        let var_name = result[abs_start + 2..abs_start + end].to_string();

        if !ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
            warn!(
                "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                var_name
            );
            pos = abs_start + end + 1;
            continue;
        }

        // Unset variables stay as ${VAR} so validation can name them
        let Ok(value) = std::env::var(&var_name) else {
            pos = abs_start + end + 1;
            continue;
        };
        result = format!(
            "{}{}{}",
            &result[..abs_start],
            value,
            &result[abs_start + end + 1..]
        );
        pos = abs_start + value.len();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = include_str!("../../../config/default.toml");

    #[test]
    fn test_default_config_parses() {
        let cfg = LedgerlineConfig::parse(DEFAULT).unwrap();
        assert_eq!(cfg.gateway.port, 8000);
        assert_eq!(cfg.gateway.bind, "0.0.0.0");
        assert!(cfg.guardrails.enabled);
        assert!(cfg.mcp.enabled);
        assert_eq!(cfg.mcp.database.max_results, 1000);
        assert_eq!(cfg.mcp.database.query_timeout_ms, 5000);
        assert_eq!(cfg.agent.max_tokens, 4096);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = LedgerlineConfig::parse(
            r#"
[providers.anthropic]
api_key = "key-1234567890"
"#,
        )
        .unwrap();
        assert_eq!(cfg.agent.model, ledgerline_core::api::DEFAULT_MODEL);
        assert_eq!(cfg.providers.anthropic.base_url, "https://api.anthropic.com");
        assert_eq!(cfg.gateway_addr().unwrap().port(), 8000);
        assert_eq!(cfg.mcp.startup_timeout_secs, 30);
    }

    #[test]
    fn test_validate_names_missing_variables() {
        let cfg = LedgerlineConfig::parse(
            r#"
[providers.anthropic]
api_key = "${LEDGERLINE_TEST_UNSET_KEY}"
"#,
        )
        .unwrap();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("ANTHROPIC_API_KEY"));
        assert!(err.contains("ERP_DB_CONNECTION"));
    }

    #[test]
    fn test_validate_ok() {
        let cfg = LedgerlineConfig::parse(
            r#"
[providers.anthropic]
api_key = "key-1234567890"

[backing_store]
connection_string = "postgres://erp@localhost/erp"
"#,
        )
        .unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_expand_skips_unlisted_vars() {
        let out = expand_env_vars("path = \"${PATH}\"");
        assert_eq!(out, "path = \"${PATH}\"");
    }

    #[test]
    fn test_expand_allowlisted_var() {
        let home = std::env::var("HOME").unwrap_or_default();
        if !home.is_empty() {
            assert_eq!(expand_env_vars("dir = \"${HOME}/x\""), format!("dir = \"{}/x\"", home));
        }
    }

    #[test]
    fn test_debug_and_redacted_hide_secrets() {
        let cfg = LedgerlineConfig::parse(
            r#"
[providers.anthropic]
api_key = "sk-ant-supersecretvalue"

[backing_store]
connection_string = "postgres://user:hunter2@db/erp"

[mcp.api]
token = "tok-very-secret"
"#,
        )
        .unwrap();
        let debug = format!("{:?}", cfg);
        assert!(!debug.contains("supersecret"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok-very-secret"));

        let shown = toml::to_string_pretty(&cfg.redacted()).unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("sk-...alue"));
    }

    #[test]
    fn test_provider_specs() {
        let mut cfg = LedgerlineConfig::parse(DEFAULT).unwrap();
        cfg.mcp.api.base_url = String::new();
        let specs = cfg.provider_specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "database");
        assert_eq!(specs[1].config["base_url"], "https://api.example.com/erp");

        cfg.mcp.enabled = false;
        assert!(cfg.provider_specs().is_empty());
    }

    #[test]
    fn test_unexpanded_api_token_not_forwarded() {
        let mut cfg = LedgerlineConfig::parse(DEFAULT).unwrap();
        cfg.mcp.api.token = "${ERP_API_TOKEN}".to_string();
        let specs = cfg.provider_specs();
        assert_eq!(specs[1].config["auth"]["token"], "");

        cfg.mcp.api.token = "erp-token-123".to_string();
        let specs = cfg.provider_specs();
        assert_eq!(specs[1].config["auth"]["token"], "erp-token-123");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default(&path, DEFAULT).unwrap();

        let cfg = LedgerlineConfig::load(&Some(path)).unwrap();
        assert_eq!(cfg.gateway.port, 8000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LedgerlineConfig::load(&Some(PathBuf::from("/nonexistent/ledgerline.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("ledgerline init"));
    }
}
