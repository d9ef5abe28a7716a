//! Typed failures that callers may need to tell apart.
//!
//! Orchestration code returns `anyhow::Result` and attaches context at each I/O
//! boundary. The enums below sit at the bottom of those chains so tests and
//! wrappers can recover them with `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::provider::ProviderKind;
use crate::core::types::SectionKind;

/// Invalid startup state or user-supplied settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment file {path} could not be loaded: {reason}")]
    MissingEnvFile { path: PathBuf, reason: String },

    #[error("you have tried to set {requested} parts; each story must have at least {minimum} parts")]
    PartCount { requested: u32, minimum: u32 },

    #[error("output template: {0}")]
    Template(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failures constructing or calling a completion provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unsupported model '{model}'")]
    UnsupportedModel { model: String },

    #[error("{kind} provider requires {variable} to be set")]
    MissingCredential {
        kind: ProviderKind,
        variable: &'static str,
    },

    #[error("build {kind} client: {reason}")]
    Client { kind: ProviderKind, reason: String },

    #[error("{kind} completion failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Request {
        kind: ProviderKind,
        status: Option<u16>,
        message: String,
    },

    #[error("{kind} returned an empty completion")]
    EmptyCompletion { kind: ProviderKind },
}

/// Violations of the draft's section ordering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("draft must start with an opening section, got {0}")]
    MissingOpening(SectionKind),

    #[error("draft already has an opening section")]
    DuplicateOpening,

    #[error("draft is closed; cannot append {0}")]
    Closed(SectionKind),
}
