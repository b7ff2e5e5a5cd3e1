//! `visual-edit`: generate (or regenerate) a whole component from a prompt
//! and an optional image, then place it on the page.
//!
//! The generation capability is resolved through a `GeneratorSource` the
//! first time this path runs, so requests that never create anything never
//! build it.

use crate::document::DocumentStore;
use crate::markup;
use crate::mismatched_instructions;
use async_trait::async_trait;
use pagewright_core::message::Message;
use pagewright_core::provider::{Provider, ProviderRequest, complete_text, strip_code_fences};
use pagewright_core::tool::{ExecutionContext, ToolHandler, ToolOutcome};
use pagewright_core::{AgentError, FailMode, Preposition, ToolInstructions, tool_names};
use pagewright_validator::SelfHealingValidator;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Everything a generator needs to write one component.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub component_name: &'a str,
    pub prompt: &'a str,
    pub image_url: Option<&'a str>,
    /// Source of a neighbouring component to match in style
    pub style_reference: Option<&'a str>,
    /// Current source when regenerating an existing component
    pub existing: Option<&'a str>,
}

#[async_trait]
pub trait ComponentGenerator: Send + Sync {
    /// Return the complete source of the component.
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, AgentError>;
}

const GENERATE_SYSTEM_PROMPT: &str = "You write a single React component file styled with Tailwind \
CSS utility classes for a marketing landing page. The file must default-export a function component \
with the exact name you are given and must compile as TypeScript. Reply with the complete file only: \
no explanation, no markdown, no code fences.";

/// Generates components through the completion service.
pub struct LlmComponentGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmComponentGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
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

    fn user_message(request: &GenerationRequest<'_>) -> String {
        let mut message = format!(
            "Component name: {}\nInstruction: {}\n",
            request.component_name, request.prompt
        );
        if let Some(image) = request.image_url {
            message.push_str(&format!("Reference image: {image}\n"));
        }
        if let Some(existing) = request.existing {
            message.push_str(&format!("\nCurrent component source (rewrite it):\n{existing}\n"));
        }
        if let Some(reference) = request.style_reference {
            message.push_str(&format!("\nMatch the style of this neighbouring component:\n{reference}\n"));
        }
        message
    }
}

#[async_trait]
impl ComponentGenerator for LlmComponentGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, AgentError> {
        let mut provider_request = ProviderRequest::new(
            &self.model,
            vec![
                Message::system(GENERATE_SYSTEM_PROMPT),
                Message::user(Self::user_message(&request)),
            ],
        )
        .with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            provider_request = provider_request.with_max_tokens(max_tokens);
        }

        debug!(component = request.component_name, "Requesting component generation");
        let reply = complete_text(self.provider.as_ref(), provider_request).await?;
        Ok(strip_code_fences(&reply))
    }
}

type GeneratorFactory = dyn Fn() -> Result<Arc<dyn ComponentGenerator>, AgentError> + Send + Sync;

/// Lazily resolved generation capability.
///
/// The factory runs on first use; a failed resolution is not cached, so a
/// later request can try again.
pub struct GeneratorSource {
    factory: Box<GeneratorFactory>,
    resolved: OnceLock<Arc<dyn ComponentGenerator>>,
}

impl GeneratorSource {
    pub fn lazy<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ComponentGenerator>, AgentError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            resolved: OnceLock::new(),
        }
    }

    /// A source that is already resolved.
    pub fn ready(generator: Arc<dyn ComponentGenerator>) -> Self {
        let resolved = OnceLock::new();
        let _ = resolved.set(generator.clone());
        Self {
            factory: Box::new(move || Ok(generator.clone())),
            resolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn ComponentGenerator>, AgentError> {
        if let Some(generator) = self.resolved.get() {
            return Ok(generator.clone());
        }
        let generator = (self.factory)()?;
        Ok(self.resolved.get_or_init(|| generator).clone())
    }
}

pub struct VisualEditTool {
    store: Arc<DocumentStore>,
    validator: Arc<SelfHealingValidator>,
    generator: Arc<GeneratorSource>,
    soft_fail_edits: bool,
}

impl VisualEditTool {
    pub fn new(
        store: Arc<DocumentStore>,
        validator: Arc<SelfHealingValidator>,
        generator: Arc<GeneratorSource>,
        soft_fail_edits: bool,
    ) -> Self {
        Self {
            store,
            validator,
            generator,
            soft_fail_edits,
        }
    }

    async fn read_if_present(&self, name: &str) -> Result<Option<String>, AgentError> {
        if self.store.exists(name).await? {
            Ok(Some(self.store.read(name).await?))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl ToolHandler for VisualEditTool {
    fn name(&self) -> &str {
        tool_names::VISUAL_EDIT
    }

    fn description(&self) -> &str {
        "Create a new component, or regenerate an existing one from an image or a visual \
         description. Fields: componentName, prompt, optional imageUrl, position (anchor \
         component) and preposition (below|above)."
    }

    async fn execute(
        &self,
        instructions: &ToolInstructions,
        ctx: &ExecutionContext,
    ) -> Result<ToolOutcome, AgentError> {
        let ToolInstructions::VisualEdit {
            component_name,
            anchor,
            preposition,
            prompt,
            image_url,
        } = instructions
        else {
            return Err(mismatched_instructions(self.name(), instructions));
        };

        let name = self.store.canonical_name(component_name)?;
        let existing = self.read_if_present(&name).await?;
        let style_reference = match anchor {
            Some(anchor) => self.read_if_present(anchor).await.ok().flatten(),
            None => None,
        };
        let image_url = image_url.as_deref().or(ctx.image.as_deref());

        let generator = self.generator.get()?;
        let source = generator
            .generate(GenerationRequest {
                component_name: &name,
                prompt,
                image_url,
                style_reference: style_reference.as_deref(),
                existing: existing.as_deref(),
            })
            .await?;
        if source.trim().is_empty() {
            return Err(AgentError::handler(self.name(), "generator returned an empty component"));
        }

        let path = self.store.write(&name, &format!("{source}\n")).await?;

        // Creation is hard-fail; regenerating an existing component is an edit.
        let mode = match (ctx.soft_fail, existing.is_some()) {
            (Some(soft), _) => FailMode::from_soft(soft),
            (None, true) => FailMode::from_soft(self.soft_fail_edits),
            (None, false) => FailMode::Hard,
        };
        let report = match self.validator.validate(&path, mode).await {
            Ok(report) => report,
            Err(err) => {
                // A new component that never validated must not linger as a known target.
                if existing.is_none() {
                    if let Err(cleanup) = self.store.remove(&name).await {
                        warn!(component = %name, error = %cleanup, "Failed to remove rejected component");
                    }
                }
                return Err(err);
            }
        };

        let mut transformations = 1;
        if existing.is_none() {
            match self.store.read_page().await? {
                Some(page) => {
                    let import_path = format!("{}/{name}", self.store.import_prefix());
                    let anchor = match anchor {
                        Some(a) => Some(self.store.canonical_name(a)?),
                        None => None,
                    };
                    let updated = markup::register_component(
                        &page,
                        &name,
                        &import_path,
                        anchor.as_deref(),
                        preposition.unwrap_or(Preposition::Below),
                    );
                    if updated != page {
                        self.store.write_page(&updated).await?;
                        transformations += 1;
                    }
                }
                None => warn!(page = self.store.page_relative(), "No page file to register the component in"),
            }
        }

        let summary = if existing.is_some() {
            format!("Regenerated {name}")
        } else {
            match (anchor, preposition) {
                (Some(anchor), Some(Preposition::Above)) => format!("Created {name} above {anchor}"),
                (Some(anchor), _) => format!("Created {name} below {anchor}"),
                (None, _) => format!("Created {name}"),
            }
        };
        info!(component = %name, created = existing.is_none(), "Visual edit applied");

        Ok(ToolOutcome {
            file_path: Some(path),
            modified_elements: vec![name],
            transformations,
            summary,
            validation: Some(report),
        })
    }
}
