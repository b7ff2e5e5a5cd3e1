//! Document handlers for Pagewright.
//!
//! Each handler applies one typed instruction to a component file on disk,
//! then runs the self-healing validator over the result:
//! color updates, text edits, deletion, video embeds, and visual
//! (re)generation.

pub mod color;
pub mod content;
pub mod delete;
pub mod document;
pub mod markup;
pub mod video;
pub mod visual;

pub use color::ColorUpdateTool;
pub use content::ContentEditTool;
pub use delete::DeleteTool;
pub use document::DocumentStore;
pub use video::VideoEmbedTool;
pub use visual::{
    ComponentGenerator, GenerationRequest, GeneratorSource, LlmComponentGenerator, VisualEditTool,
};

use pagewright_core::tool::{ExecutionContext, ToolRegistry};
use pagewright_core::{AgentError, FailMode, ToolInstructions};
use pagewright_validator::SelfHealingValidator;
use std::sync::Arc;

/// Create the registry holding all five handlers.
///
/// `soft_fail_edits` is the fail mode for in-place edits; creation always
/// validates in hard-fail mode unless the execution context overrides it.
pub fn default_registry(
    store: Arc<DocumentStore>,
    validator: Arc<SelfHealingValidator>,
    generator: Arc<GeneratorSource>,
    soft_fail_edits: bool,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ColorUpdateTool::new(
        store.clone(),
        validator.clone(),
        soft_fail_edits,
    )));
    registry.register(Box::new(ContentEditTool::new(
        store.clone(),
        validator.clone(),
        soft_fail_edits,
    )));
    registry.register(Box::new(DeleteTool::new(store.clone())));
    registry.register(Box::new(VideoEmbedTool::new(
        store.clone(),
        validator.clone(),
        soft_fail_edits,
    )));
    registry.register(Box::new(VisualEditTool::new(
        store,
        validator,
        generator,
        soft_fail_edits,
    )));
    registry
}

/// Fail mode for an in-place edit: the context override wins.
pub(crate) fn edit_fail_mode(ctx: &ExecutionContext, soft_fail_edits: bool) -> FailMode {
    FailMode::from_soft(ctx.soft_fail.unwrap_or(soft_fail_edits))
}

pub(crate) fn mismatched_instructions(tool: &str, instructions: &ToolInstructions) -> AgentError {
    AgentError::handler(
        tool,
        format!("received {} instructions", instructions.tool_name()),
    )
}
