//! Tool execution: dispatch a decision to its registered handler.

use pagewright_core::tool::{ExecutionContext, ToolOutcome, ToolRegistry};
use pagewright_core::{AgentError, AgentResponse, ToolDecision};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcomes of every payload of one decision, in execution order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub tool: String,
    pub outcomes: Vec<ToolOutcome>,
}

impl ExecutionReport {
    pub fn transformations(&self) -> usize {
        self.outcomes.iter().map(|o| o.transformations).sum()
    }

    /// The `result` value of a success envelope. A single outcome is
    /// reported as-is; several are listed with their totals.
    pub fn to_result(&self) -> serde_json::Value {
        if let [only] = self.outcomes.as_slice() {
            return serde_json::to_value(only).unwrap_or(serde_json::Value::Null);
        }
        let summary = self
            .outcomes
            .iter()
            .map(|o| o.summary.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        serde_json::json!({
            "outcomes": self.outcomes,
            "transformations": self.transformations(),
            "summary": summary,
        })
    }
}

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a decision, keeping the typed error.
    ///
    /// Payloads run in order; the first failure aborts the rest.
    pub async fn execute(
        &self,
        decision: &ToolDecision,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionReport, AgentError> {
        let Some(handler) = self.registry.get(&decision.tool) else {
            warn!(tool = %decision.tool, "Unknown tool requested");
            return Err(AgentError::UnknownTool(decision.tool.clone()));
        };

        let instructions = decision.parse_instructions()?;
        let mut outcomes = Vec::with_capacity(instructions.len());
        for (i, instruction) in instructions.iter().enumerate() {
            debug!(tool = %decision.tool, payload = i + 1, component = instruction.target(), "Executing tool");
            let outcome = handler.execute(instruction, ctx).await?;
            outcomes.push(outcome);
        }

        info!(
            tool = %decision.tool,
            payloads = outcomes.len(),
            "Tool completed"
        );
        Ok(ExecutionReport {
            tool: decision.tool.clone(),
            outcomes,
        })
    }

    /// Run a decision and wrap the result in the caller-facing envelope.
    pub async fn execute_decision(
        &self,
        decision: &ToolDecision,
        ctx: &ExecutionContext,
    ) -> AgentResponse {
        match self.execute(decision, ctx).await {
            Ok(report) => AgentResponse::completed(decision.clone(), report.to_result()),
            Err(err) => self.failed(decision, &err),
        }
    }

    pub(crate) fn failed(&self, decision: &ToolDecision, err: &AgentError) -> AgentResponse {
        let response = AgentResponse::failed_decision(decision.clone(), err);
        match err {
            AgentError::UnknownTool(_) => response
                .with_suggestions(self.registry.names().into_iter().map(String::from)),
            _ => response,
        }
    }
}
