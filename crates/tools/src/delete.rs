//! `delete`: remove a component file and take it off the page.

use crate::document::DocumentStore;
use crate::markup;
use crate::mismatched_instructions;
use async_trait::async_trait;
use pagewright_core::tool::{ExecutionContext, ToolHandler, ToolOutcome};
use pagewright_core::{AgentError, ToolInstructions, tool_names};
use std::sync::Arc;
use tracing::{info, warn};

pub struct DeleteTool {
    store: Arc<DocumentStore>,
}

impl DeleteTool {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for DeleteTool {
    fn name(&self) -> &str {
        tool_names::DELETE
    }

    fn description(&self) -> &str {
        "Delete a whole component/section and remove it from the page. Fields: component."
    }

    async fn execute(
        &self,
        instructions: &ToolInstructions,
        _ctx: &ExecutionContext,
    ) -> Result<ToolOutcome, AgentError> {
        let ToolInstructions::Delete { component } = instructions else {
            return Err(mismatched_instructions(self.name(), instructions));
        };
        let name = self.store.canonical_name(component)?;

        if !self.store.exists(&name).await? {
            return Err(AgentError::handler(
                self.name(),
                format!("component '{name}' does not exist"),
            ));
        }

        let path = self.store.remove(&name).await?;
        let mut transformations = 1;

        match self.store.read_page().await? {
            Some(page) => {
                let (updated, changed) = markup::unregister_component(&page, &name);
                if changed {
                    self.store.write_page(&updated).await?;
                    transformations += 1;
                }
            }
            None => warn!(page = self.store.page_relative(), "No page file to unregister from"),
        }

        info!(component = %name, "Component deleted");
        Ok(ToolOutcome {
            file_path: Some(path),
            modified_elements: vec![name.clone()],
            transformations,
            summary: format!("Deleted {name}"),
            validation: None,
        })
    }
}
