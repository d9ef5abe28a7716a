//! Investigation tests against real completion providers.
//!
//! Excluded from regular runs: they need network access and either a local
//! Ollama server or API credentials in the environment.
//!
//! Run with: `cargo test -p bard --test investigation_llm -- --ignored`

use bard::core::provider::DispatchPolicy;
use bard::core::types::RandomSeed;
use bard::io::completion::{CompletionRequest, complete_text, connect_model};
use bard::io::config::{BardConfig, Endpoints};
use bard::io::providers::{Credentials, HttpProviderFactory};

fn complete_once(model: &str) -> String {
    let _ = dotenvy::dotenv();
    let config = BardConfig {
        max_tokens: 256,
        ..BardConfig::default()
    };
    let factory = HttpProviderFactory::new(Credentials::from_env(), Endpoints::default(), None);
    let (_, completer) =
        connect_model(&factory, model, &DispatchPolicy::default()).expect("connect");
    let request = CompletionRequest::new(
        "Write one sentence about a lighthouse.".to_string(),
        RandomSeed::generate(),
        &config,
    );
    complete_text(completer.as_ref(), &request).expect("completion")
}

#[test]
#[ignore = "requires a local Ollama server with llama3.1"]
fn ollama_returns_text() {
    let text = complete_once("llama3.1");
    assert!(!text.trim().is_empty());
}

#[test]
#[ignore = "requires OPENAI_API_KEY"]
fn openai_returns_text() {
    let text = complete_once("gpt-4o-mini");
    assert!(!text.trim().is_empty());
}

#[test]
#[ignore = "requires GEMINI_API_KEY"]
fn gemini_returns_text() {
    let text = complete_once("gemini-1.5-flash");
    assert!(!text.trim().is_empty());
}

#[test]
#[ignore = "requires ANTHROPIC_API_KEY"]
fn anthropic_returns_text() {
    let text = complete_once("claude-3-5-haiku-latest");
    assert!(!text.trim().is_empty());
}
