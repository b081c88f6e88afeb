//! Vision provider seam and chat-completion parsing.

use serde::Deserialize;
use thiserror::Error;

use crate::prompts::{build_full_prompt, make_question_prompt};

/// Provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Provider request error: {0}")]
    Request(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A vision-language model backend.
///
/// Implementations return the raw chat-completion body; parsing is shared.
pub trait VisionProvider {
    /// Send an image with a prompt.
    fn complete_with_image(&self, image: &[u8], prompt: &str) -> ProviderResult<String>;

    /// Send a text-only prompt.
    fn complete(&self, prompt: &str) -> ProviderResult<String>;
}

/// OpenAI-style chat-completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Extract the assistant text from a chat-completion body.
pub fn parse_completion(body: &str) -> ProviderResult<String> {
    // Proxies sometimes prepend log lines before the JSON body
    let json_start = body.find('{').ok_or_else(|| {
        ProviderError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = body.rfind('}').ok_or_else(|| {
        ProviderError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ProviderError::InvalidFormat("Unbalanced braces in response".into()));
    }

    let completion: ChatCompletion = serde_json::from_str(&body[json_start..=json_end])?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(ProviderError::InvalidFormat("Completion has no content".into()));
    }
    Ok(content)
}

/// Analyze an image and return the model's free-text description.
pub fn run_analysis(
    provider: &dyn VisionProvider,
    image: &[u8],
    hint: Option<&str>,
) -> ProviderResult<String> {
    if image.is_empty() {
        return Err(ProviderError::Request("Image is empty".into()));
    }

    let prompt = build_full_prompt(hint, true);
    tracing::debug!("Requesting vision analysis ({} image bytes)", image.len());

    let body = provider.complete_with_image(image, &prompt)?;
    let analysis = parse_completion(&body)?;

    tracing::info!("Vision analysis received ({} chars)", analysis.chars().count());
    Ok(analysis)
}

/// Answer a follow-up question about an earlier analysis.
pub fn ask_followup(
    provider: &dyn VisionProvider,
    analysis: &str,
    question: &str,
) -> ProviderResult<String> {
    if question.trim().is_empty() {
        return Err(ProviderError::Request("Question is empty".into()));
    }
    let body = provider.complete(&make_question_prompt(analysis, question.trim()))?;
    parse_completion(&body)
}

/// Canned provider for testing without a model.
pub struct MockVisionProvider {
    reply: String,
}

impl MockVisionProvider {
    /// Provider whose every completion is `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }

    fn body(&self) -> ProviderResult<String> {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": self.reply } }]
        });
        Ok(body.to_string())
    }
}

impl VisionProvider for MockVisionProvider {
    fn complete_with_image(&self, _image: &[u8], _prompt: &str) -> ProviderResult<String> {
        self.body()
    }

    fn complete(&self, _prompt: &str) -> ProviderResult<String> {
        self.body()
    }
}
