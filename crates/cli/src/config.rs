//! Runtime configuration.
//!
//! Loaded in priority order (highest first):
//!
//! 1. `GITHUB_WEBHOOK_SECRET` (webhook secret only)
//! 2. `PUSHGATE_*` environment variables, e.g. `PUSHGATE_BIND_ADDRESS`
//! 3. The TOML file given with `--config`, or `pushgate.toml` if present
//! 4. Built-in defaults
//!
//! ```toml
//! bind_address = "0.0.0.0:8080"
//! webhook_path = "/webhook"
//! pipeline_service_url = "http://pipelines.internal:9000"
//! trigger_timeout_secs = 10
//!
//! [routing]
//! shared_prefixes = ["layers/shared/"]
//!
//! [[routing.rules]]
//! prefix = "lambda1/"
//! pipelines = ["lambda1-pipeline"]
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use codepipeline::PipelineServiceConfig;
use dispatch::{OwnershipTable, WebhookSecret};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// File read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pushgate.toml";

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "PUSHGATE_";

/// Environment variable holding the webhook shared secret.
pub const SECRET_ENV_VAR: &str = "GITHUB_WEBHOOK_SECRET";

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP front door binds to.
    pub bind_address: SocketAddr,

    /// Path that accepts webhook deliveries.
    pub webhook_path: String,

    /// Base URL of the pipeline execution service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_service_url: Option<String>,

    /// Deadline for each start-execution request, in seconds.
    pub trigger_timeout_secs: u64,

    /// OTLP gRPC endpoint; traces are exported only when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otlp_endpoint: Option<String>,

    /// Path ownership policy.
    pub routing: OwnershipTable,

    #[serde(default, skip_serializing)]
    webhook_secret: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            webhook_path: "/webhook".to_string(),
            pipeline_service_url: None,
            trigger_timeout_secs: PipelineServiceConfig::DEFAULT_TIMEOUT.as_secs(),
            otlp_endpoint: None,
            routing: OwnershipTable::default(),
            webhook_secret: None,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_address", &self.bind_address)
            .field("webhook_path", &self.webhook_path)
            .field("pipeline_service_url", &self.pipeline_service_url)
            .field("trigger_timeout_secs", &self.trigger_timeout_secs)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .field("routing", &self.routing)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    /// Loads and validates the configuration.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                bail!("configuration file '{}' does not exist", path.display());
            }
        }

        let config: Self = Self::figment(path)
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Env::raw().only(&[SECRET_ENV_VAR]).map(|_| "webhook_secret".into()))
    }

    fn validate(&self) -> Result<()> {
        if !self.webhook_path.starts_with('/') {
            bail!("webhook_path must start with '/', got '{}'", self.webhook_path);
        }
        if self.webhook_path == listener::HEALTH_PATH {
            bail!("webhook_path must not be {}", listener::HEALTH_PATH);
        }
        if self.trigger_timeout_secs == 0 {
            bail!("trigger_timeout_secs must be greater than 0");
        }
        Ok(())
    }

    /// The webhook secret, or `None` if unset or empty.
    pub fn webhook_secret(&self) -> Option<WebhookSecret> {
        self.webhook_secret.as_deref().and_then(WebhookSecret::new)
    }

    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_secs(self.trigger_timeout_secs)
    }

    /// Client settings for the pipeline service, if a URL is configured.
    pub fn pipeline_service(&self) -> Option<PipelineServiceConfig> {
        self.pipeline_service_url
            .as_ref()
            .map(|url| PipelineServiceConfig::new(url.clone()).with_timeout(self.trigger_timeout()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
