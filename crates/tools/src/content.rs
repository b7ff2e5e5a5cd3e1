//! `content-edit`: replace text in a component.

use crate::document::DocumentStore;
use crate::markup;
use crate::{edit_fail_mode, mismatched_instructions};
use async_trait::async_trait;
use pagewright_core::tool::{ExecutionContext, ToolHandler, ToolOutcome};
use pagewright_core::{AgentError, ToolInstructions, tool_names};
use pagewright_validator::SelfHealingValidator;
use std::sync::Arc;

pub struct ContentEditTool {
    store: Arc<DocumentStore>,
    validator: Arc<SelfHealingValidator>,
    soft_fail_edits: bool,
}

impl ContentEditTool {
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
impl ToolHandler for ContentEditTool {
    fn name(&self) -> &str {
        tool_names::CONTENT_EDIT
    }

    fn description(&self) -> &str {
        "Change text in an existing component. Fields: component, newValue, and either \
         oldValue (literal text to replace) or selector (element whose text is replaced)."
    }

    async fn execute(
        &self,
        instructions: &ToolInstructions,
        ctx: &ExecutionContext,
    ) -> Result<ToolOutcome, AgentError> {
        let ToolInstructions::ContentEdit {
            component,
            selector,
            old_value,
            new_value,
        } = instructions
        else {
            return Err(mismatched_instructions(self.name(), instructions));
        };

        let document = self.store.read(component).await?;

        let literal = old_value
            .as_deref()
            .map(|old| markup::replace_text(&document, old, new_value))
            .filter(|(_, count)| *count > 0);

        let (updated, transformations, element) = match (literal, selector.as_deref(), old_value) {
            (Some((updated, count)), _, _) => (updated, count, old_value.clone()),
            (None, Some(selector), _) => {
                let updated = markup::replace_inner_text(&document, selector, new_value)
                    .ok_or_else(|| {
                        AgentError::handler(
                            self.name(),
                            format!("element selector not found: '{selector}' in {component}"),
                        )
                    })?;
                (updated, 1, Some(selector.to_string()))
            }
            (None, None, Some(old)) => {
                return Err(AgentError::handler(
                    self.name(),
                    format!("text '{old}' not found in {component}"),
                ));
            }
            (None, None, None) => {
                return Err(AgentError::missing_field(self.name(), "selector or oldValue"));
            }
        };

        let path = self.store.write(component, &updated).await?;
        let report = self
            .validator
            .validate(&path, edit_fail_mode(ctx, self.soft_fail_edits))
            .await?;

        Ok(ToolOutcome {
            file_path: Some(path),
            modified_elements: element.into_iter().collect(),
            transformations,
            summary: format!("Updated text in {component}"),
            validation: Some(report),
        })
    }
}
