//! Tool configuration stored in `bard.toml` at the workspace root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::provider::DispatchPolicy;
use crate::error::ConfigError;

/// Tool configuration (TOML).
///
/// The file is optional and meant to be edited by hand. Missing fields take
/// the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BardConfig {
    /// Upper bound on generated tokens per completion.
    pub max_tokens: u32,

    /// Requested minimum completion length, passed to providers that accept one.
    pub min_length: u32,

    /// HTML template with a single `%s` body placeholder, relative to the root.
    pub template_path: PathBuf,

    /// Per-request HTTP timeout. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,

    /// Reject model names that match no vendor prefix and are not listed in
    /// `local_models`, instead of sending them to the local backend.
    pub strict_models: bool,

    /// Model names served by the local backend.
    pub local_models: Vec<String>,

    pub endpoints: Endpoints,
}

/// Base URLs for each provider API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub openai: String,
    pub gemini: String,
    pub anthropic: String,
    pub ollama: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com/v1".to_string(),
            gemini: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            anthropic: "https://api.anthropic.com/v1".to_string(),
            ollama: "http://localhost:11434".to_string(),
        }
    }
}

impl Default for BardConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024 * 4,
            min_length: 1024 * 2,
            template_path: PathBuf::from("output.template"),
            request_timeout_secs: None,
            strict_models: false,
            local_models: vec!["llama3.1".to_string()],
            endpoints: Endpoints::default(),
        }
    }
}

impl BardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be > 0".to_string()));
        }
        if self.min_length > self.max_tokens {
            return Err(ConfigError::Invalid(
                "min_length must not exceed max_tokens".to_string(),
            ));
        }
        if self.template_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "template_path must be non-empty".to_string(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be > 0 when set".to_string(),
            ));
        }
        let endpoints = [
            ("endpoints.openai", &self.endpoints.openai),
            ("endpoints.gemini", &self.endpoints.gemini),
            ("endpoints.anthropic", &self.endpoints.anthropic),
            ("endpoints.ollama", &self.endpoints.ollama),
        ];
        for (name, url) in endpoints {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must be non-empty")));
            }
        }
        Ok(())
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            strict: self.strict_models,
            local_models: self.local_models.clone(),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BardConfig::default()`.
pub fn load_config(path: &Path) -> Result<BardConfig> {
    if !path.exists() {
        let cfg = BardConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BardConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
