//! Completion abstraction for provider invocation.
//!
//! The [`Completer`] trait decouples the story pipeline from the provider
//! backends in [`super::providers`]. Tests use scripted completers that return
//! predetermined text without touching the network.

use std::time::Instant;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument};

use super::config::BardConfig;
use crate::core::provider::{DispatchPolicy, ProviderKind, ProviderRoute, resolve_model};
use crate::core::types::RandomSeed;
use crate::error::ProviderError;

/// Parameters for a single completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Prompt text sent as the single user message.
    pub prompt: String,
    /// Sampling seed shared across a run.
    pub seed: RandomSeed,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Requested minimum length; ignored by providers without such a knob.
    pub min_length: u32,
}

impl CompletionRequest {
    /// Build a request using the configured length limits.
    pub fn new(prompt: String, seed: RandomSeed, config: &BardConfig) -> Self {
        Self {
            prompt,
            seed,
            max_tokens: config.max_tokens,
            min_length: config.min_length,
        }
    }
}

/// A handle able to produce text completions for one model.
pub trait Completer {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Request one completion. Any provider failure is an error.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Builds completers for resolved routes.
pub trait ProviderFactory {
    fn connect(&self, route: &ProviderRoute) -> Result<Box<dyn Completer>>;
}

/// Resolve `model` and construct its completer.
///
/// Construction errors propagate unchanged; nothing is retried.
#[instrument(skip(factory, policy))]
pub fn connect_model<F: ProviderFactory>(
    factory: &F,
    model: &str,
    policy: &DispatchPolicy,
) -> Result<(ProviderRoute, Box<dyn Completer>)> {
    let route = resolve_model(model, policy)?;
    if route.fallback {
        info!(model = %route.model, "no vendor prefix matched; using local provider");
    }
    let completer = factory.connect(&route)?;
    Ok((route, completer))
}

/// Run a completion, log its duration, and reject empty output.
#[instrument(
    skip_all,
    fields(provider = %completer.kind(), model = completer.model(), seed = request.seed.get())
)]
pub fn complete_text(completer: &dyn Completer, request: &CompletionRequest) -> Result<String> {
    let start = Instant::now();
    debug!(prompt_bytes = request.prompt.len(), "requesting completion");
    let text = completer.complete(request)?;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    if text.trim().is_empty() {
        return Err(anyhow!(ProviderError::EmptyCompletion {
            kind: completer.kind()
        }));
    }
    info!(elapsed_ms, completion_bytes = text.len(), "completion finished");
    Ok(text)
}
