//! `PageAgent`: the caller-facing surface.
//!
//! ```text
//! EditRequest
//!     │  list known targets (if none given)
//!     │  request classifier: missing attachment?
//!     ▼
//! ToolSelector ──► Single ──► ToolExecutor ───────────► AgentResponse
//!              └─► Multiple ─► execute_sequential ─────► AgentResponse (isMultiOperation)
//! ```
//!
//! Errors never leave `handle` as `Err`; they are folded into the envelope
//! with suggestions the caller can act on.

use crate::classify::{ComponentResolver, IntentClassifier, RequestClassifier};
use crate::executor::ToolExecutor;
use crate::selector::{Selection, ToolSelector};
use crate::sequential::execute_sequential;
use pagewright_config::AppConfig;
use pagewright_core::tool::ExecutionContext;
use pagewright_core::{
    AgentError, AgentResponse, EditRequest, FailMode, Intent, Provider, RequestType,
    SequentialResult, ToolDecision, ValidationReport,
};
use pagewright_tools::{
    ComponentGenerator, DocumentStore, GeneratorSource, LlmComponentGenerator, default_registry,
};
use pagewright_validator::{SelfHealingValidator, StructuralChecker};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Dry-run view of how an instruction would be understood.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReport {
    pub intent: Intent,
    pub request_type: RequestType,
    pub target: Option<String>,
    pub candidates: Vec<String>,
    pub known_targets: Vec<String>,
}

pub struct PageAgent {
    store: Arc<DocumentStore>,
    validator: Arc<SelfHealingValidator>,
    selector: ToolSelector,
    executor: ToolExecutor,
    intents: IntentClassifier,
    requests: RequestClassifier,
    resolver: ComponentResolver,
    confidence_threshold: f32,
}

impl PageAgent {
    /// Wire the agent from configuration: the default provider from the
    /// router, the configured checker process, the project's documents.
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        let router = pagewright_providers::build_from_config(config);
        let provider = router.default().ok_or_else(|| {
            AgentError::ExternalServiceUnavailable(format!(
                "provider '{}' is not configured",
                config.default_provider
            ))
        })?;
        let validator = pagewright_validator::from_config(config, provider.clone());
        Ok(Self::assemble(config, provider, validator))
    }

    /// Wire the agent around an explicit provider and checker.
    pub fn from_parts(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        checker: Arc<dyn StructuralChecker>,
    ) -> Self {
        let validator = pagewright_validator::with_checker(config, provider.clone(), checker);
        Self::assemble(config, provider, validator)
    }

    fn assemble(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        validator: SelfHealingValidator,
    ) -> Self {
        let store = Arc::new(DocumentStore::from_config(&config.project));
        let validator = Arc::new(validator);

        let generator_provider = provider.clone();
        let model = config.default_model.clone();
        let temperature = config.default_temperature;
        let max_tokens = config.default_max_tokens;
        let generator = Arc::new(GeneratorSource::lazy(move || {
            info!(model = %model, "Resolving component generator");
            let generator: Arc<dyn ComponentGenerator> = Arc::new(
                LlmComponentGenerator::new(generator_provider.clone(), &model)
                    .with_temperature(temperature)
                    .with_max_tokens(max_tokens),
            );
            Ok(generator)
        }));

        let registry = Arc::new(default_registry(
            store.clone(),
            validator.clone(),
            generator,
            config.validator.soft_fail_edits,
        ));
        let selector = ToolSelector::new(
            provider,
            &config.default_model,
            &config.classifier,
            registry.catalog(),
        )
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);

        Self {
            store,
            validator,
            selector,
            executor: ToolExecutor::new(registry),
            intents: IntentClassifier::new(),
            requests: RequestClassifier::new(&config.classifier),
            resolver: ComponentResolver::new(),
            confidence_threshold: config.agent.confidence_threshold,
        }
    }

    /// Component identifiers present in the project, sorted.
    pub async fn known_targets(&self) -> Result<Vec<String>, AgentError> {
        self.store.list_targets().await
    }

    /// Registered tool names.
    pub fn tools(&self) -> Vec<String> {
        self.executor
            .registry()
            .names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Handle one instruction end to end.
    pub async fn handle(&self, mut request: EditRequest) -> AgentResponse {
        if request.targets.is_empty() {
            match self.known_targets().await {
                Ok(targets) => request.targets = targets,
                Err(err) => return AgentResponse::failure(&err),
            }
        }

        if let Err(err) = self.requests.assert_satisfiable(
            &request.prompt,
            request.image.as_deref(),
            request.layout.as_deref(),
        ) {
            info!(error = %err, "Request cannot be satisfied");
            return AgentResponse::failure(&err);
        }

        let selection = match self.selector.select(&request).await {
            Ok(selection) => selection,
            Err(err) => {
                warn!(error = %err, "Tool selection failed");
                return Self::selection_failure(&err, &request.targets);
            }
        };

        let ctx = ExecutionContext {
            prompt: Some(request.prompt.clone()),
            image: request.image.clone(),
            soft_fail: None,
        };

        match selection {
            Selection::Single(decision) => {
                let provisional = decision.is_provisional(self.confidence_threshold);
                let mut response = self.executor.execute_decision(&decision, &ctx).await;
                response.provisional = provisional;
                response
            }
            Selection::Multiple(decisions) => {
                let provisional = decisions
                    .iter()
                    .any(|d| d.is_provisional(self.confidence_threshold));
                let result = execute_sequential(&self.executor, &decisions, &ctx).await;
                Self::multi_operation(decisions, result, provisional)
            }
        }
    }

    /// Run caller-supplied decisions in order, bypassing selection.
    pub async fn handle_batch(
        &self,
        decisions: Vec<ToolDecision>,
        soft_fail: Option<bool>,
    ) -> SequentialResult {
        let ctx = ExecutionContext {
            soft_fail,
            ..ExecutionContext::default()
        };
        execute_sequential(&self.executor, &decisions, &ctx).await
    }

    /// Run the self-healing validator over one component.
    pub async fn validate(
        &self,
        component: &str,
        soft: bool,
    ) -> Result<ValidationReport, AgentError> {
        let name = self.store.canonical_name(component)?;
        if !self.store.exists(&name).await? {
            return Err(AgentError::Document {
                path: self.store.relative_path(&name)?,
                reason: "component file does not exist".into(),
            });
        }
        let path = self.store.relative_path(&name)?;
        self.validator.validate(&path, FailMode::from_soft(soft)).await
    }

    /// Classify without selecting or executing anything.
    pub async fn classify(
        &self,
        prompt: &str,
        targets: Vec<String>,
    ) -> Result<ClassificationReport, AgentError> {
        let known_targets = if targets.is_empty() {
            self.known_targets().await?
        } else {
            targets
        };
        Ok(ClassificationReport {
            intent: self.intents.classify_or_chat(prompt),
            request_type: self.requests.classify(prompt, false, false),
            target: self.resolver.resolve(prompt, &known_targets),
            candidates: self.resolver.candidates(prompt, &known_targets),
            known_targets,
        })
    }

    fn selection_failure(err: &AgentError, known: &[String]) -> AgentResponse {
        let response = AgentResponse::failure(err);
        match err {
            AgentError::ClassificationAmbiguous { .. } | AgentError::ExternalServiceUnavailable(_) => {
                response.with_suggestions(known.iter().cloned())
            }
            _ => response,
        }
    }

    fn multi_operation(
        decisions: Vec<ToolDecision>,
        result: SequentialResult,
        provisional: bool,
    ) -> AgentResponse {
        let error = (!result.success).then(|| {
            format!(
                "{} of {} operations failed",
                result.failures.len(),
                result.total_operations
            )
        });
        let error_kind = result
            .failures
            .first()
            .and_then(|f| f.error_kind.clone());
        AgentResponse {
            success: result.success,
            decisions: Some(decisions),
            result: serde_json::to_value(&result).ok(),
            error,
            error_kind,
            is_multi_operation: true,
            provisional,
            ..AgentResponse::default()
        }
    }
}
