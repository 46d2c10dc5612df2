// buildrelay-cli/src/main.rs
// ============================================================================
// Module: Relay Entry Point
// Description: Argument parsing and process composition for the relay.
// Purpose: Fetch config, compose the pipeline, and serve until shutdown.
// Dependencies: buildrelay-{config, receiver}, buildrelay-cli, clap, tokio
// ============================================================================

//! ## Overview
//! Startup is strictly fail-fast: configuration is fetched and validated,
//! the filter and binding table are compiled, and the delivery adapter runs
//! its set-up before the HTTP server binds. Any failure exits non-zero
//! without serving a single request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use buildrelay_cli::EnvSecretFetcher;
use buildrelay_cli::HttpNotifier;
use buildrelay_cli::SourceError;
use buildrelay_cli::fetch_config;
use buildrelay_config::ConfigError;
use buildrelay_config::NotifierConfig;
use buildrelay_core::Notifier;
use buildrelay_filter::StderrFilterTelemetry;
use buildrelay_receiver::ComposeError;
use buildrelay_receiver::LogNotifier;
use buildrelay_receiver::PushReceiver;
use buildrelay_receiver::ReceiverSettings;
use buildrelay_receiver::ServeError;
use buildrelay_receiver::StderrReceiverTelemetry;
use clap::Parser;
use clap::ValueEnum;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Delivery adapter variant selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AdapterKind {
    /// POST matched events to the endpoint in `delivery.url`.
    Http,
    /// Record matched events as JSON lines on stderr.
    Log,
}

/// Build-event notification relay.
#[derive(Debug, Parser)]
#[command(name = "buildrelay", version)]
struct Cli {
    /// Project or tenant whose builds this relay serves.
    #[arg(long, env = "BUILDRELAY_PROJECT")]
    project: String,
    /// Configuration location: a local path, file://, or http(s):// URL.
    #[arg(long, env = "BUILDRELAY_CONFIG")]
    config: String,
    /// Port the push receiver listens on.
    #[arg(long, env = "BUILDRELAY_PORT", default_value_t = 8080)]
    port: u16,
    /// Acknowledge and drop payloads that fail decoding instead of
    /// requesting redelivery.
    #[arg(long, env = "BUILDRELAY_TOLERATE_MALFORMED")]
    tolerate_malformed: bool,
    /// Delivery adapter to compose.
    #[arg(long, env = "BUILDRELAY_ADAPTER", value_enum, default_value_t = AdapterKind::Http)]
    adapter: AdapterKind,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal startup or serve errors.
#[derive(Debug, Error)]
enum RelayError {
    /// Configuration bytes could not be fetched.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Configuration failed to parse or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The pipeline failed to compose.
    #[error(transparent)]
    Compose(#[from] ComposeError),
    /// The HTTP server failed.
    #[error(transparent)]
    Serve(#[from] ServeError),
    /// The async runtime could not be built.
    #[error("runtime construction failed: {0}")]
    Runtime(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            emit_record(&serde_json::json!({
                "kind": "fatal",
                "error": err.to_string(),
            }));
            ExitCode::FAILURE
        }
    }
}

/// Fetches config, composes the pipeline, and serves until shutdown.
fn run(cli: &Cli) -> Result<(), RelayError> {
    let bytes = fetch_config(&cli.config)?;
    let config = NotifierConfig::from_yaml_slice(&bytes)?;
    config.validate()?;

    let settings = ReceiverSettings {
        tolerate_malformed: cli.tolerate_malformed,
        ..ReceiverSettings::default()
    };
    let notifier: Box<dyn Notifier> = match cli.adapter {
        AdapterKind::Http => Box::new(HttpNotifier::new()),
        AdapterKind::Log => Box::new(LogNotifier::new(std::io::stderr())),
    };
    let receiver =
        PushReceiver::compose(&config, notifier, Arc::new(EnvSecretFetcher), settings)?
            .with_telemetry(Arc::new(StderrFilterTelemetry), Arc::new(StderrReceiverTelemetry));

    emit_record(&serde_json::json!({
        "kind": "startup",
        "project": cli.project,
        "config": config.metadata.name,
        "port": cli.port,
        "tolerate_malformed": cli.tolerate_malformed,
    }));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| RelayError::Runtime(err.to_string()))?;
    runtime.block_on(buildrelay_receiver::serve(receiver, cli.port))?;
    Ok(())
}

/// Writes one structured record to stderr.
fn emit_record(record: &serde_json::Value) {
    let _ = writeln!(std::io::stderr(), "{record}");
}
