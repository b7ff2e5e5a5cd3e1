//! Scripted fakes shared by the workspace's tests.
//!
//! Enabled with the `testing` feature; downstream crates pull it in through
//! their dev-dependencies only.

use crate::error::ProviderError;
use crate::message::Message;
use crate::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue. Once the
/// queue is drained every further call fails with `EmptyResponse`. Requests
/// are recorded so tests can assert on what was sent.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue plain-text completions.
    pub fn texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t.as_ref()))).collect())
    }

    pub fn single_text(text: &str) -> Self {
        Self::texts(&[text])
    }

    /// A provider that has nothing to say.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A provider whose every call fails at the transport level.
    pub fn unreachable() -> Self {
        Self::new(vec![Err(ProviderError::Network("connection refused".into()))])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        requests.push(request);

        if responses.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        responses.remove(0)
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_runs_dry() {
        let provider = SequentialMockProvider::texts(&["first", "second"]);
        let req = || ProviderRequest::new("m", vec![Message::user("x")]);

        assert_eq!(provider.complete(req()).await.unwrap().message.content, "first");
        assert_eq!(provider.complete(req()).await.unwrap().message.content, "second");
        assert!(matches!(provider.complete(req()).await, Err(ProviderError::EmptyResponse)));
        assert_eq!(provider.call_count(), 3);
    }
}
