//! Model-name dispatch to completion provider kinds.
//!
//! Dispatch is a static prefix table. Names that match no vendor prefix route
//! to the local backend unless strict mode is on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Backends the tool can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Hosted providers need an API key; the local backend does not.
    pub fn is_hosted(self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor prefixes, checked in order.
const VENDOR_PREFIXES: &[(&str, ProviderKind)] = &[
    ("gpt-", ProviderKind::OpenAi),
    ("gemini-", ProviderKind::Gemini),
    ("claude-", ProviderKind::Anthropic),
];

/// Where a model name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRoute {
    pub kind: ProviderKind,
    pub model: String,
    /// True when no vendor prefix matched and the local backend was chosen.
    pub fallback: bool,
}

/// How unrecognized model names are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Reject unrecognized names not listed in `local_models`.
    pub strict: bool,
    /// Names accepted for the local backend in strict mode.
    pub local_models: Vec<String>,
}

/// Resolve a model name to a provider route.
pub fn resolve_model(model: &str, policy: &DispatchPolicy) -> Result<ProviderRoute, ProviderError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(ProviderError::UnsupportedModel {
            model: model.to_string(),
        });
    }

    if let Some((_, kind)) = VENDOR_PREFIXES
        .iter()
        .find(|(prefix, _)| model.starts_with(prefix))
    {
        return Ok(ProviderRoute {
            kind: *kind,
            model: model.to_string(),
            fallback: false,
        });
    }

    let listed = policy.local_models.iter().any(|m| m == model);
    if policy.strict && !listed {
        return Err(ProviderError::UnsupportedModel {
            model: model.to_string(),
        });
    }

    Ok(ProviderRoute {
        kind: ProviderKind::Ollama,
        model: model.to_string(),
        fallback: !listed,
    })
}
