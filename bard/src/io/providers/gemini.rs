//! Google Generative Language API (`generateContent`).

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{endpoint, note_unsupported_min_length, send_json};
use crate::core::provider::ProviderKind;
use crate::error::ProviderError;
use crate::io::completion::{Completer, CompletionRequest};

const KIND: ProviderKind = ProviderKind::Gemini;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    seed: i64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Completer backed by `POST /models/{model}:generateContent`.
pub struct GeminiCompleter {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiCompleter {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            url: endpoint(base_url, &format!("models/{model}:generateContent")),
            api_key,
            model,
        }
    }
}

impl Completer for GeminiCompleter {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        note_unsupported_min_length(KIND, request.min_length);
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                seed: request.seed.get(),
            },
        };
        let response: GenerateResponse = send_json(
            KIND,
            self.client
                .post(&self.url)
                .header("x-goog-api-key", &self.api_key),
            &body,
        )?;
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();
        let text: String = parts.into_iter().filter_map(|part| part.text).collect();
        if text.is_empty() {
            return Err(ProviderError::EmptyCompletion { kind: KIND }.into());
        }
        Ok(text)
    }
}
