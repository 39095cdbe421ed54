use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerline_core::api::mask_key;
use ledgerline_core::{ApiClient, Coordinator, ToolHandler, discover_tools};
use ledgerline_gateway::GatewayServer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::LedgerlineConfig;

#[derive(Parser)]
#[command(name = "ledgerline")]
#[command(version)]
#[command(about = "Ledgerline - chat with your ERP through specialized agents")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory and default config
    Init,

    /// Run the chat gateway
    Serve,

    /// Send a one-shot request to the coordinator
    Ask {
        /// The request to send
        message: String,
    },

    /// Interactive request loop on the terminal
    Repl,

    /// Check configuration and external dependencies
    Check,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Ask { message } => cmd_ask(&cli.config, &message).await,
        Commands::Repl => cmd_repl(&cli.config).await,
        Commands::Check => cmd_check(&cli.config).await,
        Commands::Config => cmd_config(&cli.config).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        config::write_default(&config_path, include_str!("../../../config/default.toml"))?;
        info!("Created default config at {}", config_path.display());
    }

    println!("Ledgerline initialized at {}", config_dir.display());
    println!(
        "Set ANTHROPIC_API_KEY and ERP_DB_CONNECTION (environment or .env), then edit {} as needed.",
        config_path.display()
    );
    Ok(())
}

/// Load and validate config, discover external tools, and build the coordinator
async fn build_coordinator(config_path: &Option<PathBuf>) -> Result<(LedgerlineConfig, Coordinator)> {
    let cfg = LedgerlineConfig::load(config_path)?;
    cfg.validate()?;

    let api = ApiClient::new(
        cfg.providers.anthropic.api_key.clone(),
        Some(cfg.agent.model.clone()),
    )
    .with_max_tokens(cfg.agent.max_tokens)
    .with_base_url(cfg.providers.anthropic.base_url.clone());
    info!("Using model {}", api.model());

    let external: Vec<Arc<dyn ToolHandler>> = if cfg.mcp.enabled {
        discover_tools(
            &cfg.provider_specs(),
            &config::config_dir(),
            Duration::from_secs(cfg.mcp.startup_timeout_secs),
        )
        .await
    } else {
        info!("External tool discovery disabled");
        Vec::new()
    };

    if !cfg.guardrails.enabled {
        warn!("Guardrails are disabled");
    }

    let coordinator = Coordinator::erp(Arc::new(api), external, cfg.guardrails.enabled);
    Ok((cfg, coordinator))
}

async fn cmd_serve(config_path: &Option<PathBuf>) -> Result<()> {
    let (cfg, coordinator) = build_coordinator(config_path).await?;
    let addr = cfg.gateway_addr()?;

    let cancel = CancellationToken::new();
    let server = GatewayServer::new(addr, Arc::new(coordinator));
    let gateway = tokio::spawn(server.run(cancel.clone().cancelled_owned()));

    println!("ERP chat available at http://{}", addr);

    signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");
    cancel.cancel();

    gateway.await.context("Gateway task panicked")??;
    println!("Ledgerline stopped.");
    Ok(())
}

async fn cmd_ask(config_path: &Option<PathBuf>, message: &str) -> Result<()> {
    let (_, coordinator) = build_coordinator(config_path).await?;
    let reply = coordinator.handle(message).await?;
    println!("{}", reply);
    Ok(())
}

async fn cmd_repl(config_path: &Option<PathBuf>) -> Result<()> {
    let (_, coordinator) = build_coordinator(config_path).await?;

    println!("ERP assistant ready. Type 'exit' to quit.");
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"\nERP Request: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if is_exit_command(request) {
            break;
        }

        match coordinator.handle(request).await {
            Ok(reply) => println!("\nResponse: {}", reply),
            Err(e) => println!("\nError processing request: {}", e),
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q")
}

async fn cmd_check(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = match LedgerlineConfig::load(config_path) {
        Ok(cfg) => {
            println!("[ok  ] config parsed");
            cfg
        }
        Err(e) => {
            println!("[fail] config: {:#}", e);
            return Err(e);
        }
    };

    let key = &cfg.providers.anthropic.api_key;
    println!(
        "[{}] ANTHROPIC_API_KEY  {}",
        status(!config::is_unset(key)),
        mask_key(key)
    );
    let conn = &cfg.backing_store.connection_string;
    println!(
        "[{}] ERP_DB_CONNECTION  {}",
        status(!config::is_unset(conn)),
        mask_key(conn)
    );

    if cfg.mcp.enabled {
        println!("[{}] npx on PATH", status(on_path("npx")));
    } else {
        println!("[skip] tool providers disabled");
    }
    println!("       gateway address {}:{}", cfg.gateway.bind, cfg.gateway.port);
    println!("       guardrails {}", if cfg.guardrails.enabled { "on" } else { "off" });

    cfg.validate()
}

fn status(ok: bool) -> &'static str {
    if ok { "ok  " } else { "fail" }
}

/// Whether an executable resolves on PATH (PATHEXT aware on Windows)
fn on_path(program: &str) -> bool {
    which::which(program).is_ok()
}

async fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = LedgerlineConfig::load(config_path)?;
    println!("{}", toml::to_string_pretty(&cfg.redacted())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("q"));
        assert!(!is_exit_command("quarterly report"));
    }

    #[test]
    fn test_on_path() {
        assert!(!on_path("ledgerline-no-such-program"));
        #[cfg(unix)]
        assert!(on_path("sh"));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["ledgerline", "--debug", "ask", "Check inventory for laptops"]);
        assert!(cli.debug);
        match cli.command {
            Commands::Ask { message } => assert_eq!(message, "Check inventory for laptops"),
            _ => panic!("expected ask"),
        }
        let cli = Cli::parse_from(["ledgerline", "serve", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
