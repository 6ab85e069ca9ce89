//! PushGate entry point.
//!
//! This binary is the composition root. It loads [`config::AppConfig`],
//! installs the tracing subscriber, builds the HTTP pipeline starter and the
//! dispatcher, and runs one of:
//!
//! - `pushgate serve` - HTTP front door (`POST <webhook_path>`, `GET /health`)
//! - `pushgate replay --event <file|->` - run one API-gateway proxy event and
//!   print the proxy response
//! - `pushgate routes <path>...` - show which pipelines a set of changed
//!   paths would start, without starting anything

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{ReplayArgs, RoutesArgs, ServeArgs};
use crate::config::AppConfig;

/// Routes signed source-control push webhooks to the pipelines that own the
/// changed paths.
#[derive(Debug, Parser)]
#[command(name = "pushgate", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./pushgate.toml when present.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP front door.
    Serve(ServeArgs),
    /// Dispatch one captured API-gateway event and print the response.
    Replay(ReplayArgs),
    /// Print the pipelines selected for the given changed paths.
    Routes(RoutesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let _telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    match cli.command {
        Command::Serve(args) => commands::serve(&config, args).await,
        Command::Replay(args) => commands::replay(&config, &args).await,
        Command::Routes(args) => commands::routes(&config, &args),
    }
}
