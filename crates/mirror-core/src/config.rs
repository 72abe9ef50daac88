//! Runtime configuration: defaults, optional TOML file, then environment.
//!
//! | Source | Example | Notes |
//! |--------|---------|-------|
//! | defaults | `port = 8080` | see [`MirrorConfig::load_from_path`] |
//! | file | `config/mirror.toml` | path from `MIRROR_CONFIG`, extension optional |
//! | prefixed env | `MIRROR_LLM_MODEL` | any field, `__` for nesting |
//! | plain env | `ANTHROPIC_API_KEY`, `PORT`, `ENVIRONMENT` | applied last |
//!
//! A missing or blank API key is not an error: selection runs in fallback mode.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/mirror";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// "development" or "production". Controls log format and verbosity.
    pub environment: String,
    pub port: u16,
    pub bind_address: String,
    /// Credential for the external model. `None` forces fallback selection.
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_api_url: String,
    /// Upper bound for the single selection request.
    pub llm_timeout_secs: u64,
    /// Cap on how many tools the model may select for one input.
    pub max_selections: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            anthropic_api_key: None,
            llm_model: DEFAULT_MODEL.to_string(),
            llm_api_url: DEFAULT_API_URL.to_string(),
            llm_timeout_secs: 30,
            max_selections: 3,
        }
    }
}

impl MirrorConfig {
    /// Load from `MIRROR_CONFIG` (or `config/mirror`) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MIRROR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load_from_path(&path)?;
        cfg.apply_plain_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Defaults, then the file at `path` if present, then `MIRROR_*` variables.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let path = path.as_ref().to_string_lossy().into_owned();
        let built = config::Config::builder()
            .set_default("environment", defaults.environment)?
            .set_default("port", defaults.port as i64)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("llm_model", defaults.llm_model)?
            .set_default("llm_api_url", defaults.llm_api_url)?
            .set_default("llm_timeout_secs", defaults.llm_timeout_secs as i64)?
            .set_default("max_selections", defaults.max_selections as i64)?
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("MIRROR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        cfg.anthropic_api_key = normalize_key(cfg.anthropic_api_key.take());
        Ok(cfg)
    }

    /// Overlay the unprefixed variables the deployment scripts already set.
    pub fn apply_plain_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = normalize_key(lookup("ANTHROPIC_API_KEY")) {
            self.anthropic_api_key = Some(key);
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(env) = lookup("ENVIRONMENT").map(|e| e.trim().to_string()) {
            if !env.is_empty() {
                self.environment = env;
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn has_llm_credential(&self) -> bool {
        self.anthropic_api_key.is_some()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}
