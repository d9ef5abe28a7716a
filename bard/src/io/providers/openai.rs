//! OpenAI chat completions API.

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{endpoint, note_unsupported_min_length, send_json};
use crate::core::provider::ProviderKind;
use crate::error::ProviderError;
use crate::io::completion::{Completer, CompletionRequest};

const KIND: ProviderKind = ProviderKind::OpenAi;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_completion_tokens: u32,
    seed: i64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Completer backed by `POST /chat/completions`.
pub struct OpenAiCompleter {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompleter {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            url: endpoint(base_url, "chat/completions"),
            api_key,
            model,
        }
    }
}

impl Completer for OpenAiCompleter {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        note_unsupported_min_length(KIND, request.min_length);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_completion_tokens: request.max_tokens,
            seed: request.seed.get(),
        };
        let response: ChatResponse = send_json(
            KIND,
            self.client.post(&self.url).bearer_auth(&self.api_key),
            &body,
        )?;
        Ok(first_choice_text(response)?)
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::EmptyCompletion { kind: KIND })
}
