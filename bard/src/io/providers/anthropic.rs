//! Anthropic messages API.

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{endpoint, note_unsupported_min_length, send_json};
use crate::core::provider::ProviderKind;
use crate::error::ProviderError;
use crate::io::completion::{Completer, CompletionRequest};

const KIND: ProviderKind = ProviderKind::Anthropic;
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Completer backed by `POST /messages`.
pub struct AnthropicCompleter {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl AnthropicCompleter {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            url: endpoint(base_url, "messages"),
            api_key,
            model,
        }
    }
}

impl Completer for AnthropicCompleter {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        note_unsupported_min_length(KIND, request.min_length);
        // The messages API has no sampling seed.
        debug!(seed = request.seed.get(), "seed not sent to anthropic");
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };
        let response: MessagesResponse = send_json(
            KIND,
            self.client
                .post(&self.url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION),
            &body,
        )?;
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();
        if text.is_empty() {
            return Err(ProviderError::EmptyCompletion { kind: KIND }.into());
        }
        Ok(text)
    }
}
