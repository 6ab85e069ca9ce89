//! Subcommand implementations.

use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use codepipeline::HttpPipelineStarter;
use dispatch::{routing, ChangeSet, Dispatcher, OwnershipTable, PipelineStarter};
use listener::{GatewayEvent, GatewayResponse};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override `bind_address` from the configuration.
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// API-gateway proxy event as JSON; `-` reads from stdin.
    #[arg(long)]
    pub event: PathBuf,
}

#[derive(Debug, Args)]
pub struct RoutesArgs {
    /// Repository-relative paths to route.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

pub async fn serve(config: &AppConfig, args: ServeArgs) -> Result<()> {
    let starter = pipeline_starter(config)?;
    let dispatcher = Arc::new(build_dispatcher(config, starter));
    let addr = args.bind.unwrap_or(config.bind_address);

    info!(
        address = %addr,
        webhook_path = %config.webhook_path,
        pipelines = ?config.routing.all_pipelines().names(),
        "Starting PushGate"
    );

    let router = listener::build_router(dispatcher, &config.webhook_path);
    listener::serve(addr, router)
        .await
        .with_context(|| format!("HTTP server on {addr} failed"))
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

pub async fn replay(config: &AppConfig, args: &ReplayArgs) -> Result<()> {
    let text = read_event(&args.event)?;
    let dispatcher = build_dispatcher(config, pipeline_starter(config)?);

    let response = replay_event(&dispatcher, &text).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Parses one proxy event and runs it through `dispatcher`.
pub async fn replay_event(dispatcher: &Dispatcher, text: &str) -> Result<GatewayResponse> {
    let event: GatewayEvent =
        serde_json::from_str(text).context("input is not an API-gateway proxy event")?;
    Ok(listener::handle_event(dispatcher, event).await)
}

fn read_event(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read event from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

// ---------------------------------------------------------------------------
// routes
// ---------------------------------------------------------------------------

/// Dry-run routing result printed by `pushgate routes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    pub changed_files: Vec<String>,
    pub shared_paths: Vec<String>,
    pub pipelines: Vec<String>,
}

pub fn routes(config: &AppConfig, args: &RoutesArgs) -> Result<()> {
    let plan = plan_routes(&config.routing, &args.paths);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

pub fn plan_routes(table: &OwnershipTable, paths: &[String]) -> RoutePlan {
    let changes: ChangeSet = paths.iter().cloned().collect();
    let selection = routing::route(&changes, table);

    RoutePlan {
        changed_files: changes.to_sorted_vec(),
        shared_paths: changes
            .iter()
            .filter(|path| table.is_shared(path))
            .map(String::from)
            .collect(),
        pipelines: selection.names().into_iter().map(String::from).collect(),
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn pipeline_starter(config: &AppConfig) -> Result<Arc<dyn PipelineStarter>> {
    let service = config
        .pipeline_service()
        .context("pipeline_service_url is not configured")?;
    let starter =
        HttpPipelineStarter::new(service).context("failed to create pipeline service client")?;
    Ok(Arc::new(starter))
}

pub fn build_dispatcher(config: &AppConfig, starter: Arc<dyn PipelineStarter>) -> Dispatcher {
    let secret = config.webhook_secret();
    if secret.is_none() {
        warn!("No webhook secret configured; every delivery will be answered with 500");
    }
    Dispatcher::new(secret, config.routing.clone(), starter)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
