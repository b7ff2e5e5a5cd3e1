//! A scripted checker for tests.

use crate::checker::{CheckOutcome, StructuralChecker};
use async_trait::async_trait;
use pagewright_core::AgentError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Returns queued outcomes in order; once the queue is drained it keeps
/// returning `fallback`. Counts invocations and records checked paths.
pub struct ScriptedChecker {
    queue: Mutex<Vec<CheckOutcome>>,
    fallback: CheckOutcome,
    checked: Mutex<Vec<PathBuf>>,
}

impl ScriptedChecker {
    pub fn new(outcomes: Vec<CheckOutcome>) -> Self {
        Self {
            queue: Mutex::new(outcomes),
            fallback: CheckOutcome::pass(),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn always_pass() -> Self {
        Self::new(Vec::new())
    }

    pub fn always_fail(output: &str) -> Self {
        Self {
            fallback: CheckOutcome::fail(output),
            ..Self::new(Vec::new())
        }
    }

    pub fn invocations(&self) -> usize {
        self.checked.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn checked_paths(&self) -> Vec<PathBuf> {
        self.checked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl StructuralChecker for ScriptedChecker {
    async fn check(&self, target: &Path) -> Result<CheckOutcome, AgentError> {
        self.checked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(target.to_path_buf());

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.is_empty() {
            Ok(self.fallback.clone())
        } else {
            Ok(queue.remove(0))
        }
    }
}
