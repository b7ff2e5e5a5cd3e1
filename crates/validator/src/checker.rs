//! The structural checker boundary.
//!
//! A checker decides whether one component file is structurally valid and
//! returns the raw diagnostics when it is not. `ProcessChecker` runs an
//! external program (the TypeScript compiler by default) against a scoped
//! config that includes only the target file.

use async_trait::async_trait;
use pagewright_config::ValidatorConfig;
use pagewright_core::AgentError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Result of one checker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    /// Combined stdout and stderr, passed verbatim to the fix request
    pub output: String,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            output: String::new(),
        }
    }

    pub fn fail(output: impl Into<String>) -> Self {
        Self {
            passed: false,
            output: output.into(),
        }
    }
}

#[async_trait]
pub trait StructuralChecker: Send + Sync {
    /// Check the file at `target` (absolute, or relative to the working
    /// directory).
    async fn check(&self, target: &Path) -> Result<CheckOutcome, AgentError>;
}

/// Runs the configured checker program as a child process.
pub struct ProcessChecker {
    program: String,
    args: Vec<String>,
    project_root: PathBuf,
    base_config: PathBuf,
    error_markers: Vec<String>,
    timeout: Duration,
}

impl ProcessChecker {
    pub fn new(config: &ValidatorConfig, project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            base_config: project_root.join(&config.base_config),
            project_root,
            error_markers: config.error_markers.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn has_error_marker(&self, output: &str) -> bool {
        self.error_markers.iter().any(|m| output.contains(m.as_str()))
    }

    /// Contents of the per-file config: extend the project config, include
    /// only the target.
    fn scoped_config(&self, target: &Path) -> serde_json::Value {
        let extends = std::path::absolute(&self.base_config).unwrap_or_else(|_| self.base_config.clone());
        let include = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        serde_json::json!({
            "extends": extends.to_string_lossy(),
            "include": [include],
            "compilerOptions": { "noEmit": true }
        })
    }
}

/// Path of the scoped checker config for `target`: `.<stem>.check.json` in
/// the same directory.
pub fn scoped_config_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "component".into());
    let name = format!(".{stem}.check.json");
    match target.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Removes the scoped config when dropped, whichever way the check exits.
struct ScopedConfigGuard {
    path: PathBuf,
}

impl Drop for ScopedConfigGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove scoped checker config");
            }
        }
    }
}

#[async_trait]
impl StructuralChecker for ProcessChecker {
    async fn check(&self, target: &Path) -> Result<CheckOutcome, AgentError> {
        let config_path = scoped_config_path(target);
        let body = serde_json::to_string_pretty(&self.scoped_config(target))
            .map_err(|e| AgentError::Checker(e.to_string()))?;

        tokio::fs::write(&config_path, body)
            .await
            .map_err(|e| AgentError::document(config_path.display(), e))?;
        let _guard = ScopedConfigGuard {
            path: config_path.clone(),
        };

        debug!(program = %self.program, config = %config_path.display(), "Running structural checker");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&config_path)
            .current_dir(&self.project_root)
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(AgentError::Checker(format!("failed to start '{}': {e}", self.program)));
            }
            Err(_) => {
                return Err(AgentError::Checker(format!(
                    "'{}' did not finish within {}s",
                    self.program,
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{stdout}{stderr}").trim().to_string();

        if output.status.success() && !self.has_error_marker(&combined) {
            Ok(CheckOutcome::pass())
        } else {
            let code = output.status.code().unwrap_or(-1);
            debug!(exit_code = code, "Structural check failed");
            Ok(CheckOutcome::fail(combined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh_checker(root: &Path, script: &str) -> ProcessChecker {
        let config = ValidatorConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
            timeout_secs: 5,
            ..ValidatorConfig::default()
        };
        ProcessChecker::new(&config, root)
    }

    #[test]
    fn scoped_config_sits_beside_target() {
        let path = scoped_config_path(Path::new("/site/src/components/Hero.tsx"));
        assert_eq!(path, PathBuf::from("/site/src/components/.Hero.check.json"));
    }

    #[test]
    fn scoped_config_includes_only_target() {
        let checker = sh_checker(Path::new("/site"), "true");
        let config = checker.scoped_config(Path::new("/site/src/components/Hero.tsx"));
        assert_eq!(config["include"], serde_json::json!(["Hero.tsx"]));
        assert!(config["extends"].as_str().unwrap().ends_with("tsconfig.json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passing_run_removes_scoped_config() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Hero.tsx");
        std::fs::write(&target, "export default function Hero() {}").unwrap();

        // $0 is the scoped config path appended after the script
        let checker = sh_checker(dir.path(), "test -f \"$0\"");
        let outcome = checker.check(&target).await.unwrap();

        assert!(outcome.passed);
        assert!(!scoped_config_path(&target).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn error_marker_fails_even_on_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Hero.tsx");
        std::fs::write(&target, "export default function Hero( {}").unwrap();

        let checker = sh_checker(dir.path(), "echo \"Hero.tsx(1,30): error TS1005: ')' expected.\"");
        let outcome = checker.check(&target).await.unwrap();

        assert!(!outcome.passed);
        assert!(outcome.output.contains("TS1005"));
        assert!(!scoped_config_path(&target).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Faq.tsx");
        std::fs::write(&target, "").unwrap();

        let checker = sh_checker(dir.path(), "echo broken >&2; exit 2");
        let outcome = checker.check(&target).await.unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.output, "broken");
    }

    #[tokio::test]
    async fn missing_program_is_a_checker_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Hero.tsx");
        std::fs::write(&target, "").unwrap();

        let config = ValidatorConfig {
            program: "pagewright-no-such-checker".into(),
            args: vec![],
            ..ValidatorConfig::default()
        };
        let checker = ProcessChecker::new(&config, dir.path());
        let err = checker.check(&target).await.unwrap_err();
        assert_eq!(err.kind(), "Checker");
        assert!(!scoped_config_path(&target).exists());
    }
}
