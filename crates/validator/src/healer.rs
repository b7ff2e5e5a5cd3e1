//! Self-healing validation: check, ask the completion service for a fix,
//! write it back, check again.
//!
//! The loop is explicit and bounded. An always-failing document sees
//! `MAX_FIX_ATTEMPTS + 1` checks and exactly `MAX_FIX_ATTEMPTS` fixes before
//! the fail mode decides between `ValidationExhausted` and a logged
//! soft-pass.

use crate::checker::StructuralChecker;
use pagewright_core::message::Message;
use pagewright_core::provider::{Provider, ProviderRequest, complete_text, strip_code_fences};
use pagewright_core::{AgentError, FailMode, ValidationReport, ValidationStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fix requests allowed per validation run.
pub const MAX_FIX_ATTEMPTS: u32 = 3;

const FIX_SYSTEM_PROMPT: &str = "You repair component source files that fail a structural check. \
You receive the complete file and the checker's diagnostics. Reply with the complete corrected \
file and nothing else: no explanation, no markdown, no code fences. Preserve everything the \
diagnostics do not require you to change.";

pub struct SelfHealingValidator {
    checker: Arc<dyn StructuralChecker>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    project_root: PathBuf,
    enabled: bool,
}

impl SelfHealingValidator {
    pub fn new(
        checker: Arc<dyn StructuralChecker>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            checker,
            provider,
            model: model.into(),
            temperature: 0.1,
            max_tokens: None,
            project_root: project_root.into(),
            enabled: true,
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

    /// A disabled validator reports `Skipped` without running the checker.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Validate the document at `relative_path` (relative to the project
    /// root), repairing it through the completion service when it fails.
    pub async fn validate(
        &self,
        relative_path: &str,
        mode: FailMode,
    ) -> Result<ValidationReport, AgentError> {
        if !self.enabled {
            debug!(path = relative_path, "Validation disabled, skipping");
            return Ok(ValidationReport::skipped(relative_path));
        }

        let full_path = self.project_root.join(relative_path);
        let mut attempt: u32 = 1;
        let mut checks: u32 = 0;
        let mut fixes: u32 = 0;

        loop {
            checks += 1;
            let outcome = self.checker.check(&full_path).await?;

            if outcome.passed {
                info!(path = relative_path, attempt, "Structural check passed");
                return Ok(ValidationReport {
                    path: relative_path.to_string(),
                    status: ValidationStatus::Pass,
                    checks,
                    fixes,
                });
            }

            info!(path = relative_path, attempt, "Structural check failed");

            if attempt > MAX_FIX_ATTEMPTS {
                return match mode {
                    FailMode::Soft => {
                        warn!(
                            path = relative_path,
                            attempts = MAX_FIX_ATTEMPTS,
                            "Fix attempts exhausted, keeping the document as written (soft-fail)"
                        );
                        Ok(ValidationReport {
                            path: relative_path.to_string(),
                            status: ValidationStatus::SoftPass,
                            checks,
                            fixes,
                        })
                    }
                    FailMode::Hard => Err(AgentError::ValidationExhausted {
                        path: relative_path.to_string(),
                        attempts: MAX_FIX_ATTEMPTS,
                    }),
                };
            }

            self.apply_fix(relative_path, &full_path, &outcome.output, attempt)
                .await?;
            fixes += 1;
            attempt += 1;
        }
    }

    async fn apply_fix(
        &self,
        relative_path: &str,
        full_path: &std::path::Path,
        diagnostics: &str,
        attempt: u32,
    ) -> Result<(), AgentError> {
        let document = tokio::fs::read_to_string(full_path)
            .await
            .map_err(|e| AgentError::document(relative_path, e))?;

        info!(path = relative_path, attempt, "Requesting fix from completion service");

        let user = format!(
            "File: {relative_path}\n\nChecker output:\n{diagnostics}\n\nCurrent file:\n{document}"
        );
        let mut request = ProviderRequest::new(
            &self.model,
            vec![Message::system(FIX_SYSTEM_PROMPT), Message::user(user)],
        )
        .with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let reply = complete_text(self.provider.as_ref(), request).await?;
        let fixed = strip_code_fences(&reply);

        tokio::fs::write(full_path, format!("{fixed}\n"))
            .await
            .map_err(|e| AgentError::document(relative_path, e))?;

        debug!(path = relative_path, attempt, bytes = fixed.len(), "Fix written");
        Ok(())
    }
}
