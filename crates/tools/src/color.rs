//! `color-update`: rewrite utility color classes in a component.

use crate::document::DocumentStore;
use crate::markup;
use crate::{edit_fail_mode, mismatched_instructions};
use async_trait::async_trait;
use pagewright_core::tool::{ExecutionContext, ToolHandler, ToolOutcome};
use pagewright_core::{AgentError, ToolInstructions, tool_names};
use pagewright_validator::SelfHealingValidator;
use std::sync::Arc;
use tracing::debug;

pub struct ColorUpdateTool {
    store: Arc<DocumentStore>,
    validator: Arc<SelfHealingValidator>,
    soft_fail_edits: bool,
}

impl ColorUpdateTool {
    pub fn new(
        store: Arc<DocumentStore>,
        validator: Arc<SelfHealingValidator>,
        soft_fail_edits: bool,
    ) -> Self {
        Self {
            store,
            validator,
            soft_fail_edits,
        }
    }
}

#[async_trait]
impl ToolHandler for ColorUpdateTool {
    fn name(&self) -> &str {
        tool_names::COLOR_UPDATE
    }

    fn description(&self) -> &str {
        "Change a background, text or border color in an existing component. \
         Fields: component, color, property (background|text|border), optional selector and oldValue."
    }

    async fn execute(
        &self,
        instructions: &ToolInstructions,
        ctx: &ExecutionContext,
    ) -> Result<ToolOutcome, AgentError> {
        let ToolInstructions::ColorUpdate {
            component,
            selector,
            property,
            old_color,
            color,
        } = instructions
        else {
            return Err(mismatched_instructions(self.name(), instructions));
        };

        let document = self.store.read(component).await?;
        let (updated, rewrites) = markup::rewrite_color_classes(
            &document,
            *property,
            color,
            old_color.as_deref(),
            selector.as_deref(),
        );

        if rewrites == 0 {
            let scope = match selector {
                Some(s) => format!("on '{s}'"),
                None => "in the component".into(),
            };
            return Err(AgentError::handler(
                self.name(),
                format!(
                    "no {}-* color class to change {scope} of {component}",
                    property.class_prefix()
                ),
            ));
        }

        let path = self.store.write(component, &updated).await?;
        debug!(component = %component, rewrites, "Color classes rewritten");

        let report = self
            .validator
            .validate(&path, edit_fail_mode(ctx, self.soft_fail_edits))
            .await?;

        Ok(ToolOutcome {
            file_path: Some(path),
            modified_elements: vec![selector.clone().unwrap_or_else(|| component.clone())],
            transformations: rewrites,
            summary: format!(
                "Set {} color of {component} to {color}",
                property.class_prefix()
            ),
            validation: Some(report),
        })
    }
}
