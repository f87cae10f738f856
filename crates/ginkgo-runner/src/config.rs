/*
[INPUT]:  YAML configuration file and GINKGO_ACCESS_TOKEN
[OUTPUT]: Validated trader configuration
[POS]:    Configuration layer - runner setup
[UPDATE]: When adding new configuration options
*/

use std::path::Path;

use anyhow::{Context, bail};
use ginkgo_adapter::Environment;
use serde::{Deserialize, Serialize};

/// Overrides `access_token` from the file when set and non-empty
pub const ACCESS_TOKEN_ENV: &str = "GINKGO_ACCESS_TOKEN";

/// Top-level configuration for the trading runner
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GinkgoConfig {
    /// One of `sandbox`, `practice`, `live`
    pub environment: Environment,
    /// Personal access token; may be left empty when supplied through the environment
    #[serde(default)]
    pub access_token: String,
    pub account_id: u64,
    /// Instruments streamed to the expert advisor (e.g. "EUR_USD")
    pub instruments: Vec<String>,
    /// Also stream account events
    #[serde(default)]
    pub stream_events: bool,
    #[serde(default = "default_ignore_heartbeat")]
    pub ignore_heartbeat: bool,
}

fn default_ignore_heartbeat() -> bool {
    true
}

impl GinkgoConfig {
    /// Load configuration from YAML file, apply the token override and validate
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let mut config = Self::parse_yaml(&content)?;
        config.apply_token_override(std::env::var(ACCESS_TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn parse_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("parse config yaml")?;
        Ok(config)
    }

    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            self.access_token = token;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.access_token.trim().is_empty() {
            bail!("access_token is empty; set it in the config file or {ACCESS_TOKEN_ENV}");
        }
        if self.instruments.is_empty() {
            bail!("at least one instrument is required");
        }
        if let Some(blank) = self.instruments.iter().find(|name| name.trim().is_empty()) {
            bail!("instrument name {blank:?} is blank");
        }
        if self.environment == Environment::Sandbox {
            // Sandbox has no streaming endpoint
            bail!("environment 'sandbox' does not support streaming");
        }
        Ok(())
    }
}
