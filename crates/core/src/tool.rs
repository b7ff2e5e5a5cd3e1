//! Tool trait: the abstraction over document-mutation handlers.
//!
//! Each handler (color update, content edit, delete, video embed, visual
//! edit) implements `ToolHandler` and is registered in a `ToolRegistry` under
//! its tool name. The executor looks handlers up by the decision's `tool`.

use crate::decision::ToolInstructions;
use crate::error::AgentError;
use crate::validation::ValidationReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-request context passed alongside a decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    /// The original instruction, for handlers that generate content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Attached image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Override the configured validator fail mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_fail: Option<bool>,
}

/// Structured detail about what a handler changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    /// File written or removed, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Identifiers of the elements that were modified
    #[serde(default)]
    pub modified_elements: Vec<String>,

    /// Number of individual rewrites applied
    pub transformations: usize,

    /// Human-readable summary
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

/// The core handler trait.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The registered tool name (e.g., "color-update").
    fn name(&self) -> &str;

    /// What this handler does (shown to the completion service).
    fn description(&self) -> &str;

    /// Apply one typed instruction.
    async fn execute(
        &self,
        instructions: &ToolInstructions,
        ctx: &ExecutionContext,
    ) -> Result<ToolOutcome, AgentError>;
}

/// A registry of available handlers, keyed by tool name.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a handler. Replaces any existing handler with the same name.
    pub fn register(&mut self, tool: Box<dyn ToolHandler>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a handler by name.
    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// `name: description` lines for prompting the completion service.
    pub fn catalog(&self) -> String {
        self.tools
            .values()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopDelete;

    #[async_trait]
    impl ToolHandler for NoopDelete {
        fn name(&self) -> &str {
            "delete"
        }
        fn description(&self) -> &str {
            "Remove a component"
        }
        async fn execute(
            &self,
            instructions: &ToolInstructions,
            _ctx: &ExecutionContext,
        ) -> Result<ToolOutcome, AgentError> {
            Ok(ToolOutcome {
                modified_elements: vec![instructions.target().to_string()],
                transformations: 1,
                summary: "removed".into(),
                ..ToolOutcome::default()
            })
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NoopDelete));
        assert!(registry.get("delete").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["delete"]);
        assert!(registry.catalog().contains("delete: Remove a component"));
    }

    #[tokio::test]
    async fn registry_handler_executes() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NoopDelete));
        let outcome = registry
            .get("delete")
            .unwrap()
            .execute(
                &ToolInstructions::Delete { component: "Faq".into() },
                &ExecutionContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.modified_elements, vec!["Faq"]);
    }
}
