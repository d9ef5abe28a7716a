//! Local Ollama server (`/api/generate`).

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{endpoint, note_unsupported_min_length, send_json};
use crate::core::provider::ProviderKind;
use crate::io::completion::{Completer, CompletionRequest};

const KIND: ProviderKind = ProviderKind::Ollama;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    seed: i64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Completer backed by a non-streaming `POST /api/generate`.
pub struct OllamaCompleter {
    client: Client,
    url: String,
    model: String,
}

impl OllamaCompleter {
    pub fn new(client: Client, base_url: &str, model: String) -> Self {
        Self {
            client,
            url: endpoint(base_url, "api/generate"),
            model,
        }
    }
}

impl Completer for OllamaCompleter {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        note_unsupported_min_length(KIND, request.min_length);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                seed: request.seed.get(),
                num_predict: request.max_tokens,
            },
        };
        let response: GenerateResponse =
            send_json(KIND, self.client.post(&self.url), &body)?;
        Ok(response.response)
    }
}
