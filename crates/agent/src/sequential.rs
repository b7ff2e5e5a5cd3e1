//! Sequential multi-operation execution.
//!
//! Decisions run strictly one after another. A failure is recorded and the
//! run continues with the next operation; nothing is retried.

use crate::executor::ToolExecutor;
use pagewright_core::tool::ExecutionContext;
use pagewright_core::{
    AgentResponse, OperationFailure, OperationResult, SequentialResult, SequentialSummary,
    ToolDecision,
};
use tracing::{info, warn};

pub async fn execute_sequential(
    executor: &ToolExecutor,
    decisions: &[ToolDecision],
    ctx: &ExecutionContext,
) -> SequentialResult {
    let total = decisions.len();
    let mut results = Vec::with_capacity(total);
    let mut failures = Vec::new();

    info!(operations = total, "Sequential run: starting");

    for (i, decision) in decisions.iter().enumerate() {
        let index = i + 1;
        info!(operation = index, total, tool = %decision.tool, "Operation starting");

        let response = match executor.execute(decision, ctx).await {
            Ok(report) => {
                info!(operation = index, tool = %decision.tool, "Operation finished");
                AgentResponse::completed(decision.clone(), report.to_result())
            }
            Err(err) => {
                warn!(operation = index, tool = %decision.tool, error = %err, "Operation failed");
                failures.push(OperationFailure {
                    operation_index: index,
                    decision: decision.clone(),
                    error: err.to_string(),
                    error_kind: Some(err.kind().to_string()),
                });
                executor.failed(decision, &err)
            }
        };

        results.push(OperationResult {
            operation_index: index,
            decision: decision.clone(),
            success: response.success,
            response,
        });
    }

    let successful = total - failures.len();
    info!(total, successful, "Sequential run: complete");

    SequentialResult {
        success: failures.is_empty(),
        total_operations: total,
        successful_operations: successful,
        results,
        failures,
        summary: SequentialSummary::new(total, successful),
    }
}
