//! Result envelopes returned across the caller-facing boundary.

use crate::decision::ToolDecision;
use crate::error::AgentError;
use serde::{Deserialize, Serialize};

/// The externally observable result of one top-level request.
///
/// Failures are reported here as `success: false` with an error text and
/// suggestions; they never cross the boundary as `Err`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<ToolDecision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<ToolDecision>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Stable error code (`UnknownTool`, `ValidationExhausted`, …)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    #[serde(default)]
    pub is_multi_operation: bool,

    /// The decision was low-confidence or hedged; confirm before trusting it
    #[serde(default)]
    pub provisional: bool,
}

impl AgentResponse {
    /// A successful single-operation response.
    pub fn completed(decision: ToolDecision, result: serde_json::Value) -> Self {
        Self {
            success: true,
            tool: Some(decision.tool.clone()),
            reasoning: Some(decision.reasoning.clone()),
            confidence: Some(decision.confidence),
            decision: Some(decision),
            result: Some(result),
            ..Self::default()
        }
    }

    /// A failure not tied to any decision (classification, selection).
    pub fn failure(error: &AgentError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
            suggestions: error.suggestions(),
            ..Self::default()
        }
    }

    /// A failure while executing a specific decision.
    pub fn failed_decision(decision: ToolDecision, error: &AgentError) -> Self {
        Self {
            tool: Some(decision.tool.clone()),
            reasoning: Some(decision.reasoning.clone()),
            confidence: Some(decision.confidence),
            decision: Some(decision),
            ..Self::failure(error)
        }
    }

    pub fn with_suggestions(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        for suggestion in extra {
            if !self.suggestions.contains(&suggestion) {
                self.suggestions.push(suggestion);
            }
        }
        self
    }
}

/// One entry of a sequential run, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    /// 1-based position in the batch
    pub operation_index: usize,
    pub decision: ToolDecision,
    pub success: bool,
    pub response: AgentResponse,
}

/// An operation that did not succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFailure {
    /// 1-based position in the batch
    pub operation_index: usize,
    pub decision: ToolDecision,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequentialSummary {
    pub total: usize,
    pub successful: usize,
    /// Rounded success percentage, 0 for an empty batch
    pub percentage: u32,
}

impl SequentialSummary {
    pub fn new(total: usize, successful: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((successful as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            total,
            successful,
            percentage,
        }
    }
}

/// Aggregate report of a sequential multi-operation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentialResult {
    /// True iff every operation succeeded
    pub success: bool,
    pub total_operations: usize,
    pub successful_operations: usize,
    pub results: Vec<OperationResult>,
    pub failures: Vec<OperationFailure>,
    pub summary: SequentialSummary,
}
