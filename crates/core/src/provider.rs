//! Provider trait: the abstraction over the completion service.
//!
//! The selector and the validator treat the service as an opaque
//! text-completion oracle: `{model, messages, temperature, max_tokens}` in,
//! one assistant message out.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, OpenRouter, Ollama,
//! custom URLs).

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "openai/gpt-4o")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.2
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Constructed once by the host and passed into every component that needs
/// it, so tests can substitute a scripted fake.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Send a request and return the reply text, treating an empty reply as a
/// failure.
pub async fn complete_text(
    provider: &dyn Provider,
    request: ProviderRequest,
) -> Result<String, ProviderError> {
    let response = provider.complete(request).await?;
    let content = response.message.content;
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(content)
}

/// Strip code-fence wrapping from a completion so it can be treated as raw
/// document content.
///
/// Handles a leading ```` ```lang ```` line, a trailing ```` ``` ```` line and
/// surrounding whitespace. Text without fences is returned trimmed.
pub fn strip_code_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string (```tsx) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_request_defaults() {
        let req = ProviderRequest::new("gpt-4o", vec![]);
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn request_serializes_max_tokens_only_when_set() {
        let json = serde_json::to_string(&ProviderRequest::new("m", vec![])).unwrap();
        assert!(!json.contains("max_tokens"));
        let json = serde_json::to_string(&ProviderRequest::new("m", vec![]).with_max_tokens(64)).unwrap();
        assert!(json.contains("\"max_tokens\":64"));
    }

    #[test]
    fn strips_language_fence() {
        let reply = "```tsx\nexport default function Hero() {}\n```";
        assert_eq!(strip_code_fences(reply), "export default function Hero() {}");
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        let reply = "\n```\n<div />\n```\n\n";
        assert_eq!(strip_code_fences(reply), "<div />");
    }

    #[test]
    fn unfenced_reply_is_trimmed() {
        assert_eq!(strip_code_fences("  <section />  "), "<section />");
    }
}
