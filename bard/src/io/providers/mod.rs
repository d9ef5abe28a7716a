//! HTTP completion providers.
//!
//! One module per vendor API. All of them use the blocking `reqwest` client and
//! share the request/error handling below.

mod anthropic;
mod gemini;
mod ollama;
mod openai;

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::completion::{Completer, ProviderFactory};
use super::config::Endpoints;
use crate::core::provider::{ProviderKind, ProviderRoute};
use crate::error::ProviderError;

pub use anthropic::AnthropicCompleter;
pub use gemini::GeminiCompleter;
pub use ollama::OllamaCompleter;
pub use openai::OpenAiCompleter;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const OLLAMA_HOST: &str = "OLLAMA_HOST";

/// Longest provider error body echoed into an error message.
const ERROR_BODY_LIMIT: usize = 500;

/// Provider credentials captured from the environment at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub ollama_host: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<set>");
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("ollama_host", &self.ollama_host)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            openai_api_key: get(OPENAI_API_KEY),
            gemini_api_key: get(GEMINI_API_KEY).or_else(|| get(GOOGLE_API_KEY)),
            anthropic_api_key: get(ANTHROPIC_API_KEY),
            ollama_host: get(OLLAMA_HOST),
        }
    }
}

/// Factory that talks to the real provider APIs.
#[derive(Debug, Clone)]
pub struct HttpProviderFactory {
    credentials: Credentials,
    endpoints: Endpoints,
    timeout: Option<Duration>,
}

impl HttpProviderFactory {
    pub fn new(credentials: Credentials, endpoints: Endpoints, timeout: Option<Duration>) -> Self {
        Self {
            credentials,
            endpoints,
            timeout,
        }
    }

    fn require(
        kind: ProviderKind,
        value: &Option<String>,
        variable: &'static str,
    ) -> Result<String, ProviderError> {
        value
            .clone()
            .ok_or(ProviderError::MissingCredential { kind, variable })
    }

    fn ollama_base_url(&self) -> String {
        match &self.credentials.ollama_host {
            Some(host) if host.contains("://") => host.clone(),
            Some(host) => format!("http://{host}"),
            None => self.endpoints.ollama.clone(),
        }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn connect(&self, route: &ProviderRoute) -> Result<Box<dyn Completer>> {
        let kind = route.kind;
        let model = route.model.clone();
        let completer: Box<dyn Completer> = match kind {
            ProviderKind::OpenAi => {
                let key = Self::require(kind, &self.credentials.openai_api_key, OPENAI_API_KEY)?;
                let client = build_client(kind, self.timeout)?;
                Box::new(OpenAiCompleter::new(client, &self.endpoints.openai, key, model))
            }
            ProviderKind::Gemini => {
                let key = Self::require(kind, &self.credentials.gemini_api_key, GEMINI_API_KEY)?;
                let client = build_client(kind, self.timeout)?;
                Box::new(GeminiCompleter::new(client, &self.endpoints.gemini, key, model))
            }
            ProviderKind::Anthropic => {
                let key =
                    Self::require(kind, &self.credentials.anthropic_api_key, ANTHROPIC_API_KEY)?;
                let client = build_client(kind, self.timeout)?;
                Box::new(AnthropicCompleter::new(
                    client,
                    &self.endpoints.anthropic,
                    key,
                    model,
                ))
            }
            ProviderKind::Ollama => {
                let client = build_client(kind, self.timeout)?;
                Box::new(OllamaCompleter::new(client, &self.ollama_base_url(), model))
            }
        };
        info!(provider = %kind, model = %route.model, "provider ready");
        Ok(completer)
    }
}

fn build_client(kind: ProviderKind, timeout: Option<Duration>) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::Client {
            kind,
            reason: err.to_string(),
        })
}

/// Join a base URL and a path without doubling slashes.
fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send a JSON body and decode a JSON response, mapping failures to [`ProviderError`].
fn send_json<B: Serialize, R: DeserializeOwned>(
    kind: ProviderKind,
    request: RequestBuilder,
    body: &B,
) -> Result<R, ProviderError> {
    let response = request
        .json(body)
        .send()
        .map_err(|err| ProviderError::Request {
            kind,
            status: None,
            message: err.to_string(),
        })?;

    let status = response.status();
    debug!(provider = %kind, status = status.as_u16(), "provider responded");
    if !status.is_success() {
        let text = response.text().unwrap_or_default();
        return Err(ProviderError::Request {
            kind,
            status: Some(status.as_u16()),
            message: error_message(&text),
        });
    }

    response.json::<R>().map_err(|err| ProviderError::Request {
        kind,
        status: Some(status.as_u16()),
        message: format!("decode response: {err}"),
    })
}

/// Extract a human-readable message from a provider error body.
///
/// Handles `{"error": {"message": ...}}` and `{"error": "..."}`; anything else
/// is returned as (bounded) raw text.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(message) = error["message"].as_str() {
            return message.to_string();
        }
        if let Some(message) = error.as_str() {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty error body".to_string();
    }
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Log that a provider has no minimum-length parameter.
fn note_unsupported_min_length(kind: ProviderKind, min_length: u32) {
    if min_length > 0 {
        debug!(provider = %kind, min_length, "provider has no minimum length parameter; ignoring");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(credentials: Credentials) -> HttpProviderFactory {
        HttpProviderFactory::new(credentials, Endpoints::default(), None)
    }

    fn route(kind: ProviderKind, model: &str) -> ProviderRoute {
        ProviderRoute {
            kind,
            model: model.to_string(),
            fallback: false,
        }
    }

    fn all_keys() -> Credentials {
        Credentials::from_lookup(|name| match name {
            OPENAI_API_KEY | GEMINI_API_KEY | ANTHROPIC_API_KEY => Some("k".to_string()),
            _ => None,
        })
    }

    #[test]
    fn connect_builds_completer_for_each_kind_without_network() {
        let factory = factory(all_keys());
        let cases = [
            (ProviderKind::OpenAi, "gpt-4o"),
            (ProviderKind::Gemini, "gemini-1.5-pro"),
            (ProviderKind::Anthropic, "claude-3-5-haiku-latest"),
            (ProviderKind::Ollama, "llama3.1"),
        ];
        for (kind, model) in cases {
            let completer = factory.connect(&route(kind, model)).expect("connect");
            assert_eq!(completer.kind(), kind);
            assert_eq!(completer.model(), model);
        }
    }

    #[test]
    fn hosted_provider_without_key_fails_construction() {
        let factory = factory(Credentials::default());
        let err = factory
            .connect(&route(ProviderKind::Anthropic, "claude-3-opus"))
            .err()
            .expect("missing key");
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::MissingCredential {
                kind: ProviderKind::Anthropic,
                variable: ANTHROPIC_API_KEY,
            })
        ));
    }

    #[test]
    fn local_provider_needs_no_key() {
        let factory = factory(Credentials::default());
        let completer = factory
            .connect(&route(ProviderKind::Ollama, "mistral"))
            .expect("connect");
        assert_eq!(completer.kind(), ProviderKind::Ollama);
    }

    #[test]
    fn google_key_is_accepted_for_gemini() {
        let creds = Credentials::from_lookup(|name| {
            (name == GOOGLE_API_KEY).then(|| "g".to_string())
        });
        assert_eq!(creds.gemini_api_key.as_deref(), Some("g"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let creds = Credentials::from_lookup(|_| Some("  ".to_string()));
        assert!(creds.openai_api_key.is_none());
        assert!(creds.ollama_host.is_none());
    }

    #[test]
    fn debug_output_redacts_keys() {
        let rendered = format!("{:?}", all_keys());
        assert!(rendered.contains("<set>"));
        assert!(!rendered.contains("\"k\""));
    }

    #[test]
    fn ollama_host_without_scheme_gets_http() {
        let creds = Credentials {
            ollama_host: Some("gpu-box:11434".to_string()),
            ..Credentials::default()
        };
        assert_eq!(factory(creds).ollama_base_url(), "http://gpu-box:11434");
        assert_eq!(
            factory(Credentials::default()).ollama_base_url(),
            "http://localhost:11434"
        );
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(
            error_message(r#"{"error":{"message":"bad key","type":"auth"}}"#),
            "bad key"
        );
        assert_eq!(error_message(r#"{"error":"model not found"}"#), "model not found");
        assert_eq!(error_message("  gateway down "), "gateway down");
        assert_eq!(error_message(""), "empty error body");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
