// crates/mgnrega-cli/src/main.rs
// ============================================================================
// Module: MGNREGA CLI Entry Point
// Description: Command dispatcher for the sync server and one-shot syncs.
// Purpose: Run the cron-facing server, manual syncs, and config checks.
// Dependencies: clap, mgnrega-config, mgnrega-sync, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! `mgnrega serve` hosts the schedule trigger over HTTP. `mgnrega sync` runs
//! one gated sync in-process and prints the trigger response body, which is
//! handy for backfills and for cron hosts that prefer a command to a URL.
//! `mgnrega config` validates or prints configuration. Logs go to stderr so
//! stdout stays machine-readable.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use mgnrega_config::MgnregaConfig;
use mgnrega_config::StoreType;
use mgnrega_config::config_toml_example;
use mgnrega_core::Timestamp;
use mgnrega_sync::SyncServer;
use mgnrega_sync::build_trigger;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "mgnrega", version, about = "MGNREGA open-data sync service")]
struct Cli {
    /// Config file path (defaults to `MGNREGA_CONFIG` or `mgnrega.toml`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    log_json: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server hosting the cron trigger.
    Serve,
    /// Run one sync in-process and print the result.
    Sync(SyncCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `sync` command.
#[derive(Args, Debug)]
struct SyncCommand {
    /// Skip the run when data was updated inside the freshness window.
    #[arg(long, action = ArgAction::SetTrue)]
    respect_freshness: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, printing a redacted summary.
    Check,
    /// Print an example configuration file.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Config {
            command: ConfigCommand::Example,
        } => command_config_example(),
        Commands::Config {
            command: ConfigCommand::Check,
        } => command_config_check(&load_config(cli.config)?),
        Commands::Serve => {
            init_tracing(cli.log_json)?;
            command_serve(&load_config(cli.config)?).await
        }
        Commands::Sync(command) => {
            init_tracing(cli.log_json)?;
            command_sync(&load_config(cli.config)?, &command).await
        }
    }
}

/// Installs the global tracing subscriber writing to stderr.
fn init_tracing(json: bool) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = if json { builder.json().try_init() } else { builder.try_init() };
    result.map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))
}

/// Loads and validates configuration.
fn load_config(path: Option<PathBuf>) -> CliResult<MgnregaConfig> {
    MgnregaConfig::load(path.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config: &MgnregaConfig) -> CliResult<ExitCode> {
    let server = SyncServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `sync` command.
async fn command_sync(config: &MgnregaConfig, command: &SyncCommand) -> CliResult<ExitCode> {
    let trigger = build_trigger(config)
        .map_err(|err| CliError::new(format!("failed to initialize sync: {err}")))?;
    let outcome = trigger.execute(Timestamp::now(), command.respect_freshness).await;
    info!(outcome = outcome.label(), "sync command finished");
    write_json(&outcome.body(Timestamp::now()))?;
    Ok(exit_code_for_status(outcome.status_code()))
}

/// Executes the `config check` command.
fn command_config_check(config: &MgnregaConfig) -> CliResult<ExitCode> {
    write_json(&redacted_summary(config))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config example` command.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout(&config_toml_example())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Summarizes effective configuration with secrets replaced by presence flags.
fn redacted_summary(config: &MgnregaConfig) -> Value {
    let store_type = match config.store.store_type {
        StoreType::Memory => "memory",
        StoreType::Sqlite => "sqlite",
    };
    json!({
        "source": {
            "base_url": config.source.base_url,
            "api_key_configured": config.source.api_key.is_some(),
            "timeout_ms": config.source.timeout_ms,
            "page_limit": config.source.page_limit,
        },
        "server": {
            "bind": config.server.bind,
            "allowed_origins": config.server.allowed_origins,
        },
        "trigger": {
            "secret_configured": config.trigger.secret.is_some(),
            "freshness_window_secs": config.trigger.freshness_window_secs,
            "lock_ttl_secs": config.trigger.lock_ttl_secs,
        },
        "store": {
            "type": store_type,
            "path": config.store.path.display().to_string(),
        },
        "normalize": {
            "coercion_policy": config.normalize.coercion_policy,
        },
        "audit": {
            "enabled": config.audit.enabled,
            "path": config.audit.path,
        },
    })
}

/// Maps a trigger status code to a process exit code.
fn exit_code_for_status(status: u16) -> ExitCode {
    match status {
        200 => ExitCode::SUCCESS,
        409 => ExitCode::from(3),
        503 => ExitCode::from(4),
        _ => ExitCode::FAILURE,
    }
}

/// Writes pretty JSON and a trailing newline to stdout.
fn write_json(value: &Value) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    write_stdout(&format!("{rendered}\n"))
}

/// Writes a message to stdout.
fn write_stdout(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(message.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
