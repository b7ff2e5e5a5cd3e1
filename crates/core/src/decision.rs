//! Tool decisions: which handler runs, and with what instructions.
//!
//! On the wire a decision carries a loose instruction bag whose meaningful
//! fields depend on the tool. `ToolInstructions` is the typed form: one
//! variant per tool with exactly its required fields. Parsing happens at the
//! selector boundary and again at dispatch, so a missing field surfaces as
//! `MissingRequiredField` before any document is touched.

use crate::error::AgentError;
use serde::{Deserialize, Serialize};

/// Registered tool identifiers.
pub mod tool_names {
    pub const COLOR_UPDATE: &str = "color-update";
    pub const CONTENT_EDIT: &str = "content-edit";
    pub const DELETE: &str = "delete";
    pub const VIDEO_EMBED: &str = "video-embed";
    pub const VISUAL_EDIT: &str = "visual-edit";

    pub const ALL: [&str; 5] = [COLOR_UPDATE, CONTENT_EDIT, DELETE, VIDEO_EMBED, VISUAL_EDIT];
}

/// The loose instruction payload as produced by the completion service or a
/// batch caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "target", alias = "file")]
    pub component: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "element")]
    pub selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "old_value")]
    pub old_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "new_value")]
    pub new_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "targetColor")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "video_url")]
    pub video_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "image_url")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "component_name")]
    pub component_name: Option<String>,

    /// Anchor component for insertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preposition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// One payload or an ordered list of payloads for the same tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instructions {
    Many(Vec<InstructionPayload>),
    One(InstructionPayload),
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::One(InstructionPayload::default())
    }
}

impl Instructions {
    pub fn payloads(&self) -> Vec<&InstructionPayload> {
        match self {
            Instructions::Many(items) => items.iter().collect(),
            Instructions::One(item) => vec![item],
        }
    }

    pub fn payloads_mut(&mut self) -> Vec<&mut InstructionPayload> {
        match self {
            Instructions::Many(items) => items.iter_mut().collect(),
            Instructions::One(item) => vec![item],
        }
    }
}

/// The selector's output: which tool to run and with what instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDecision {
    pub tool: String,

    #[serde(default)]
    pub confidence: f32,

    #[serde(default)]
    pub reasoning: String,

    #[serde(default)]
    pub instructions: Instructions,
}

const AMBIGUITY_MARKERS: [&str; 7] = [
    "ambiguous",
    "unclear",
    "assum",
    "guess",
    "not sure",
    "uncertain",
    "could refer",
];

impl ToolDecision {
    pub fn new(
        tool: impl Into<String>,
        confidence: f32,
        reasoning: impl Into<String>,
        instructions: Instructions,
    ) -> Self {
        Self {
            tool: tool.into(),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            instructions,
        }
    }

    pub fn single(
        tool: impl Into<String>,
        confidence: f32,
        reasoning: impl Into<String>,
        payload: InstructionPayload,
    ) -> Self {
        Self::new(tool, confidence, reasoning, Instructions::One(payload))
    }

    /// Parse every payload into its typed form.
    pub fn parse_instructions(&self) -> Result<Vec<ToolInstructions>, AgentError> {
        let payloads = self.instructions.payloads();
        if payloads.is_empty() {
            return Err(AgentError::missing_field(&self.tool, "instructions"));
        }
        payloads
            .into_iter()
            .map(|p| ToolInstructions::parse(&self.tool, p))
            .collect()
    }

    /// True when the reasoning text admits uncertainty.
    pub fn signals_ambiguity(&self) -> bool {
        let reasoning = self.reasoning.to_lowercase();
        AMBIGUITY_MARKERS.iter().any(|m| reasoning.contains(m))
    }

    /// Whether a caller should confirm with the user before executing.
    pub fn is_provisional(&self, threshold: f32) -> bool {
        self.confidence < 1.0 && (self.confidence < threshold || self.signals_ambiguity())
    }
}

/// Which utility-class family a color change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorProperty {
    Background,
    Text,
    Border,
}

impl ColorProperty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "background" | "background-color" | "bg" | "fill" => Some(ColorProperty::Background),
            "text" | "color" | "font" | "text-color" | "foreground" => Some(ColorProperty::Text),
            "border" | "border-color" | "outline" => Some(ColorProperty::Border),
            _ => None,
        }
    }

    /// Utility-class prefix (`bg`, `text`, `border`).
    pub fn class_prefix(&self) -> &'static str {
        match self {
            ColorProperty::Background => "bg",
            ColorProperty::Text => "text",
            ColorProperty::Border => "border",
        }
    }
}

/// Where a new component goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preposition {
    Below,
    Above,
}

impl Preposition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "below" | "under" | "underneath" | "beneath" | "after" => Some(Preposition::Below),
            "above" | "before" | "on top of" | "over" => Some(Preposition::Above),
            _ => None,
        }
    }
}

/// Typed instructions, one variant per registered tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInstructions {
    ColorUpdate {
        component: String,
        selector: Option<String>,
        property: ColorProperty,
        old_color: Option<String>,
        color: String,
    },
    ContentEdit {
        component: String,
        selector: Option<String>,
        old_value: Option<String>,
        new_value: String,
    },
    Delete {
        component: String,
    },
    VideoEmbed {
        component: String,
        selector: Option<String>,
        video_url: String,
    },
    VisualEdit {
        component_name: String,
        anchor: Option<String>,
        preposition: Option<Preposition>,
        prompt: String,
        image_url: Option<String>,
    },
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required(tool: &str, field: &str, value: &Option<String>) -> Result<String, AgentError> {
    non_empty(value).ok_or_else(|| AgentError::missing_field(tool, field))
}

impl ToolInstructions {
    /// Parse a loose payload for `tool` into its typed variant.
    pub fn parse(tool: &str, p: &InstructionPayload) -> Result<Self, AgentError> {
        use tool_names::*;
        match tool {
            COLOR_UPDATE => {
                let color = non_empty(&p.color)
                    .or_else(|| non_empty(&p.new_value))
                    .ok_or_else(|| AgentError::missing_field(tool, "color"))?;
                let property = match non_empty(&p.property) {
                    Some(raw) => ColorProperty::parse(&raw).ok_or_else(|| {
                        AgentError::handler(tool, format!("unsupported color property '{raw}'"))
                    })?,
                    None => ColorProperty::Background,
                };
                Ok(ToolInstructions::ColorUpdate {
                    component: required(tool, "component", &p.component)?,
                    selector: non_empty(&p.selector),
                    property,
                    old_color: non_empty(&p.old_value),
                    color,
                })
            }
            CONTENT_EDIT => Ok(ToolInstructions::ContentEdit {
                component: required(tool, "component", &p.component)?,
                selector: non_empty(&p.selector),
                old_value: non_empty(&p.old_value),
                new_value: p
                    .new_value
                    .clone()
                    .ok_or_else(|| AgentError::missing_field(tool, "newValue"))?,
            }),
            DELETE => Ok(ToolInstructions::Delete {
                component: required(tool, "component", &p.component)?,
            }),
            VIDEO_EMBED => Ok(ToolInstructions::VideoEmbed {
                component: required(tool, "component", &p.component)?,
                selector: non_empty(&p.selector),
                video_url: required(tool, "videoUrl", &p.video_url)?,
            }),
            VISUAL_EDIT => {
                let component_name = non_empty(&p.component_name)
                    .or_else(|| non_empty(&p.component))
                    .ok_or_else(|| AgentError::missing_field(tool, "componentName"))?;
                let preposition = match non_empty(&p.preposition) {
                    Some(raw) => Some(Preposition::parse(&raw).ok_or_else(|| {
                        AgentError::handler(tool, format!("unsupported preposition '{raw}'"))
                    })?),
                    None => None,
                };
                Ok(ToolInstructions::VisualEdit {
                    component_name,
                    anchor: non_empty(&p.position),
                    preposition,
                    prompt: required(tool, "prompt", &p.prompt)?,
                    image_url: non_empty(&p.image_url),
                })
            }
            other => Err(AgentError::UnknownTool(other.to_string())),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        use tool_names::*;
        match self {
            ToolInstructions::ColorUpdate { .. } => COLOR_UPDATE,
            ToolInstructions::ContentEdit { .. } => CONTENT_EDIT,
            ToolInstructions::Delete { .. } => DELETE,
            ToolInstructions::VideoEmbed { .. } => VIDEO_EMBED,
            ToolInstructions::VisualEdit { .. } => VISUAL_EDIT,
        }
    }

    /// The component the instruction acts on.
    pub fn target(&self) -> &str {
        match self {
            ToolInstructions::ColorUpdate { component, .. }
            | ToolInstructions::ContentEdit { component, .. }
            | ToolInstructions::Delete { component }
            | ToolInstructions::VideoEmbed { component, .. } => component,
            ToolInstructions::VisualEdit { component_name, .. } => component_name,
        }
    }
}
