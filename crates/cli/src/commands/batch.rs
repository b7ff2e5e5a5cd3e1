//! `pagewright batch`: Run explicit tool decisions from a file.

use pagewright_core::ToolDecision;
use serde::Deserialize;
use std::path::Path;
use std::process::ExitCode;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Plain(Vec<ToolDecision>),
    #[serde(rename_all = "camelCase")]
    Wrapped {
        decisions: Vec<ToolDecision>,
        #[serde(default)]
        soft_fail: Option<bool>,
    },
}

impl BatchFile {
    fn into_parts(self) -> (Vec<ToolDecision>, Option<bool>) {
        match self {
            BatchFile::Plain(decisions) => (decisions, None),
            BatchFile::Wrapped {
                decisions,
                soft_fail,
            } => (decisions, soft_fail),
        }
    }
}

fn parse(content: &str) -> Result<(Vec<ToolDecision>, Option<bool>), serde_json::Error> {
    serde_json::from_str::<BatchFile>(content).map(BatchFile::into_parts)
}

pub async fn run(config: Option<&Path>, file: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let (decisions, soft_fail) =
        parse(&content).map_err(|e| format!("Invalid batch file {}: {e}", file.display()))?;

    let agent = super::load_agent(config)?;
    let result = agent.handle_batch(decisions, soft_fail).await;

    super::emit(&result, result.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECISION: &str = r#"{"tool": "delete", "confidence": 1.0, "reasoning": "remove",
        "instructions": {"component": "Pricing"}}"#;

    #[test]
    fn plain_array() {
        let (decisions, soft) = parse(&format!("[{DECISION}]")).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].tool, "delete");
        assert!(soft.is_none());
    }

    #[test]
    fn wrapped_with_soft_fail() {
        let (decisions, soft) =
            parse(&format!(r#"{{"decisions": [{DECISION}, {DECISION}], "softFail": false}}"#)).unwrap();
        assert_eq!(decisions.len(), 2);
        assert_eq!(soft, Some(false));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse(r#"{"tool": "delete"}"#).is_err());
        assert!(parse("not json").is_err());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(run(None, &missing).await.is_err());
    }
}
