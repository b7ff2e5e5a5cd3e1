//! `video-embed`: point a component's video player at a new URL.

use crate::document::DocumentStore;
use crate::markup;
use crate::{edit_fail_mode, mismatched_instructions};
use async_trait::async_trait;
use pagewright_core::tool::{ExecutionContext, ToolHandler, ToolOutcome};
use pagewright_core::{AgentError, ToolInstructions, tool_names};
use pagewright_validator::SelfHealingValidator;
use std::sync::Arc;

pub struct VideoEmbedTool {
    store: Arc<DocumentStore>,
    validator: Arc<SelfHealingValidator>,
    soft_fail_edits: bool,
}

impl VideoEmbedTool {
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
impl ToolHandler for VideoEmbedTool {
    fn name(&self) -> &str {
        tool_names::VIDEO_EMBED
    }

    fn description(&self) -> &str {
        "Replace the video shown in a component. Fields: component, videoUrl, optional selector."
    }

    async fn execute(
        &self,
        instructions: &ToolInstructions,
        ctx: &ExecutionContext,
    ) -> Result<ToolOutcome, AgentError> {
        let ToolInstructions::VideoEmbed {
            component,
            selector,
            video_url,
        } = instructions
        else {
            return Err(mismatched_instructions(self.name(), instructions));
        };

        let embed_url = markup::normalize_video_url(video_url);
        let document = self.store.read(component).await?;
        let updated = markup::replace_media_src(&document, selector.as_deref(), &embed_url)
            .ok_or_else(|| {
                AgentError::handler(
                    self.name(),
                    format!("no <iframe> or <video> element found in {component}"),
                )
            })?;

        let path = self.store.write(component, &updated).await?;
        let report = self
            .validator
            .validate(&path, edit_fail_mode(ctx, self.soft_fail_edits))
            .await?;

        Ok(ToolOutcome {
            file_path: Some(path),
            modified_elements: vec![selector.clone().unwrap_or_else(|| "video".into())],
            transformations: 1,
            summary: format!("Embedded {embed_url} in {component}"),
            validation: Some(report),
        })
    }
}
