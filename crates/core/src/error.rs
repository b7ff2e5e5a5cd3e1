//! Error types for the Pagewright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! `AgentError` is the pipeline taxonomy; `ProviderError` covers the
//! completion-service transport.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

/// Which attachment a visual request referenced but did not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Image,
    Layout,
}

impl std::fmt::Display for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attachment::Image => f.write_str("image"),
            Attachment::Layout => f.write_str("layout"),
        }
    }
}

/// Failures of the classification → selection → execution → validation
/// pipeline.
///
/// Classifiers return ambiguity as `None`; these variants are what the
/// selector, handlers and validator raise. The executor turns every one of
/// them into a failed envelope.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("ClassificationAmbiguous: {reason}")]
    ClassificationAmbiguous {
        reason: String,
        candidates: Vec<String>,
    },

    #[error("MissingAttachment: the request references an {attachment} but none was supplied")]
    MissingAttachment { attachment: Attachment },

    #[error("UnknownTool: no handler is registered for '{0}'")]
    UnknownTool(String),

    #[error("MissingRequiredField: tool '{tool}' requires '{field}'")]
    MissingRequiredField { tool: String, field: String },

    #[error("HandlerFailure: {tool}: {reason}")]
    HandlerFailure { tool: String, reason: String },

    #[error("ValidationExhausted: {path} still fails the structural check after {attempts} fix attempts")]
    ValidationExhausted { path: String, attempts: u32 },

    #[error("ExternalServiceUnavailable: {0}")]
    ExternalServiceUnavailable(String),

    #[error("Document error at {path}: {reason}")]
    Document { path: String, reason: String },

    #[error("Checker could not run: {0}")]
    Checker(String),
}

impl AgentError {
    /// Stable machine-readable code for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::ClassificationAmbiguous { .. } => "ClassificationAmbiguous",
            AgentError::MissingAttachment { .. } => "MissingAttachment",
            AgentError::UnknownTool(_) => "UnknownTool",
            AgentError::MissingRequiredField { .. } => "MissingRequiredField",
            AgentError::HandlerFailure { .. } => "HandlerFailure",
            AgentError::ValidationExhausted { .. } => "ValidationExhausted",
            AgentError::ExternalServiceUnavailable(_) => "ExternalServiceUnavailable",
            AgentError::Document { .. } => "Document",
            AgentError::Checker(_) => "Checker",
        }
    }

    pub fn ambiguous(reason: impl Into<String>, candidates: Vec<String>) -> Self {
        AgentError::ClassificationAmbiguous {
            reason: reason.into(),
            candidates,
        }
    }

    pub fn missing_field(tool: impl Into<String>, field: impl Into<String>) -> Self {
        AgentError::MissingRequiredField {
            tool: tool.into(),
            field: field.into(),
        }
    }

    pub fn handler(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        AgentError::HandlerFailure {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn document(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        AgentError::Document {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }

    /// Suggestions a caller can act on without another model round trip.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            AgentError::ClassificationAmbiguous { candidates, .. } => candidates.clone(),
            AgentError::MissingAttachment { attachment } => {
                vec![format!("Attach the {attachment} the request refers to, or rephrase without it")]
            }
            AgentError::MissingRequiredField { tool, field } => {
                vec![format!("Provide '{field}' for the {tool} tool")]
            }
            AgentError::ExternalServiceUnavailable(_) => {
                vec!["Name the target component explicitly (e.g. \"hero: change the headline to ...\")".into()]
            }
            _ => Vec::new(),
        }
    }
}

impl From<ProviderError> for AgentError {
    fn from(err: ProviderError) -> Self {
        AgentError::ExternalServiceUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn agent_error_text_carries_kind() {
        let err = AgentError::UnknownTool("not-a-real-tool".into());
        assert_eq!(err.kind(), "UnknownTool");
        assert!(err.to_string().contains("UnknownTool"));
        assert!(err.to_string().contains("not-a-real-tool"));
    }

    #[test]
    fn provider_failure_maps_to_unavailable() {
        let err: AgentError = ProviderError::Network("connection refused".into()).into();
        assert_eq!(err.kind(), "ExternalServiceUnavailable");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn ambiguity_suggests_candidates() {
        let err = AgentError::ambiguous("two components match", vec!["Hero".into(), "Header".into()]);
        assert_eq!(err.suggestions(), vec!["Hero".to_string(), "Header".to_string()]);
    }
}
