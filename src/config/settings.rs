//! Settings structures for answer-engine configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Endpoint used when inference runs against a local Ollama server
pub const LOCAL_INFERENCE_BASE_URL: &str = "http://localhost:11434/v1";

/// API key Ollama expects from OpenAI-compatible clients
pub const LOCAL_INFERENCE_API_KEY: &str = "ollama";

/// Upper bound for every timeout setting, in seconds (one day)
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// Seconds to `Duration`, clamped to `0..=MAX_TIMEOUT_SECS`
fn timeout_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_TIMEOUT_SECS)).unwrap_or(Duration::ZERO)
}

fn valid_timeout(secs: f64) -> bool {
    secs.is_finite() && (0.0..=MAX_TIMEOUT_SECS).contains(&secs)
}

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub inference: InferenceSettings,
    pub outgoing: OutgoingSettings,
    pub media: MediaSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject timeouts that are negative, non-finite or above a day
    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("outgoing.request_timeout", self.outgoing.request_timeout),
            ("inference.request_timeout", self.inference.request_timeout),
            ("media.validation_timeout", self.media.validation_timeout),
        ];
        for (name, secs) in timeouts {
            if !valid_timeout(secs) {
                bail!(
                    "{} must be between 0 and {} seconds, got {}",
                    name,
                    MAX_TIMEOUT_SECS,
                    secs
                );
            }
        }
        Ok(())
    }

    /// Merge with environment variables (ANSWER_ENGINE_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("ANSWER_ENGINE_SEARCH_PROVIDER") {
            self.search.provider = val;
        }
        if let Some(val) = var("ANSWER_ENGINE_PAGE_COUNT") {
            if let Ok(count) = val.parse() {
                self.search.page_count = count;
            }
        }
        if let Some(val) = var("ANSWER_ENGINE_INFERENCE_MODEL") {
            self.inference.model = val;
        }
        if let Some(val) = var("ANSWER_ENGINE_INFERENCE_BASE_URL") {
            self.inference.base_url = val;
        }
        if let Some(val) = var("ANSWER_ENGINE_USE_LOCAL_INFERENCE") {
            if let Ok(use_local) = val.trim().parse() {
                self.inference.use_local = use_local;
            }
        }
        if let Some(val) = var("ANSWER_ENGINE_REQUEST_TIMEOUT") {
            match val.trim().parse::<f64>() {
                Ok(secs) if valid_timeout(secs) => self.outgoing.request_timeout = secs,
                _ => warn!("Ignoring invalid ANSWER_ENGINE_REQUEST_TIMEOUT: {}", val),
            }
        }
    }
}

/// Web search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Active provider name: brave, serper or google
    pub provider: String,
    /// Number of results requested from the provider
    pub page_count: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: "serper".to_string(),
            page_count: 10,
        }
    }
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// Model identifier sent with every completion request
    pub model: String,
    /// Base URL of the remote OpenAI-compatible endpoint
    pub base_url: String,
    /// Target a local Ollama server instead of `base_url`
    pub use_local: bool,
    /// Deadline for a whole streamed answer, in seconds
    pub request_timeout: f64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            use_local: false,
            request_timeout: 120.0,
        }
    }
}

impl InferenceSettings {
    pub fn timeout(&self) -> Duration {
        timeout_secs(self.request_timeout)
    }

    /// Base URL requests should actually go to
    pub fn effective_base_url(&self) -> &str {
        if self.use_local {
            LOCAL_INFERENCE_BASE_URL
        } else {
            &self.base_url
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds, applied to every provider call
    pub request_timeout: f64,
    /// Optional proxy for all outgoing traffic
    pub proxy: Option<String>,
    /// Fixed user agent (none = random browser string)
    pub user_agent: Option<String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            proxy: None,
            user_agent: None,
        }
    }
}

impl OutgoingSettings {
    pub fn timeout(&self) -> Duration {
        timeout_secs(self.request_timeout)
    }
}

/// Media lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Deadline for each HEAD probe, in seconds
    pub validation_timeout: f64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            validation_timeout: 5.0,
        }
    }
}

impl MediaSettings {
    pub fn validation_timeout(&self) -> Duration {
        timeout_secs(self.validation_timeout)
    }
}
