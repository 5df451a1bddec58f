//! Monitor configuration.
//!
//! A monitor's durable state between invocations: its rule set, response
//! templates, auto-reply settings, and ingest mode, loadable from a single
//! TOML document. Validation lives in [`validator`] and runs out-of-band
//! whenever configuration changes.

pub mod validator;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alert::ResponseTemplate;
use crate::reply::AutoReplyConfig;
use crate::rules::RuleSet;

fn default_poll_interval() -> u64 {
    300
}

/// Polling ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Named source to poll (e.g. `"imap-inbox"`).
    pub source: String,
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: u64,
}

/// Webhook ingest settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret expected on inbound deliveries. Allowed to be absent,
    /// but flagged insecure by the validator.
    #[serde(default)]
    pub secret: Option<String>,
}

/// How events reach this monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum IngestConfig {
    Polling(PollingConfig),
    Webhook(WebhookConfig),
}

/// Full configuration for one monitor instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rules: RuleSet,
    #[serde(default)]
    pub templates: Vec<ResponseTemplate>,
    #[serde(default)]
    pub auto_reply: AutoReplyConfig,
    #[serde(default)]
    pub ingest: Option<IngestConfig>,
    /// Outward alert delivery target; must pass webhook validation.
    #[serde(default)]
    pub alert_webhook_url: Option<String>,
}

impl MonitorConfig {
    /// Parse a monitor configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse monitor configuration TOML")
    }

    /// Load a monitor configuration from a TOML file at `path`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read monitor config: {}", path.display()))?;
        let config = Self::from_toml(&content)?;
        debug!(
            monitor = %config.name,
            rules = config.rules.enabled_count(),
            "loaded monitor configuration"
        );
        Ok(config)
    }

    /// Serialize this configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize monitor configuration")
    }
}
