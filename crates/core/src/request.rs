//! The raw instruction and the values the classifiers derive from it.

use serde::{Deserialize, Serialize};

/// A user instruction as received by the agent.
///
/// Created per request and consumed once; nothing in the pipeline mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    /// Free-text instruction ("hero: change the button color to blue")
    pub prompt: String,

    /// The user's answer to a previous disambiguation question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<String>,

    /// Reference (URL or path) to an attached image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Reference to an attached layout sketch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    /// Currently known target identifiers. Empty = let the agent list them.
    #[serde(default, alias = "knownTargets", skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

impl EditRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_disambiguation(mut self, answer: impl Into<String>) -> Self {
        self.disambiguation = Some(answer.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }
}

/// Coarse category of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Create,
    Edit,
    Delete,
    Chat,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Create => "CREATE",
            Intent::Edit => "EDIT",
            Intent::Delete => "DELETE",
            Intent::Chat => "CHAT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Standard,
    Visual,
}

/// Whether an instruction is a textual edit or a visual one, and which
/// attachments it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestType {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub has_image: bool,
    pub has_layout: bool,
}

impl RequestType {
    pub fn standard() -> Self {
        Self {
            kind: RequestKind::Standard,
            has_image: false,
            has_layout: false,
        }
    }

    pub fn visual(has_image: bool, has_layout: bool) -> Self {
        Self {
            kind: RequestKind::Visual,
            has_image,
            has_layout,
        }
    }

    pub fn is_visual(&self) -> bool {
        self.kind == RequestKind::Visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_type_wire_shape() {
        let json = serde_json::to_value(RequestType::visual(true, false)).unwrap();
        assert_eq!(json["type"], "visual");
        assert_eq!(json["hasImage"], true);
        assert_eq!(json["hasLayout"], false);
    }

    #[test]
    fn intent_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Intent::Delete).unwrap(), "\"DELETE\"");
        assert_eq!(Intent::Chat.to_string(), "CHAT");
    }

    #[test]
    fn edit_request_accepts_minimal_json() {
        let req: EditRequest = serde_json::from_str(r#"{"prompt":"delete the faq section"}"#).unwrap();
        assert_eq!(req.prompt, "delete the faq section");
        assert!(req.image.is_none());
        assert!(req.targets.is_empty());
    }
}
