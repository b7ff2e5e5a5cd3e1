//! Configuration loading, validation, and management for Pagewright.
//!
//! Loads `./pagewright.toml` when present, otherwise
//! `~/.pagewright/config.toml`, with environment variable overrides.
//! Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the project-local configuration file.
pub const PROJECT_CONFIG_FILE: &str = "pagewright.toml";

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default completion provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature for tool selection and generation
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Upper bound for a single completion call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Where the page's component files live
    #[serde(default)]
    pub project: ProjectConfig,

    /// Structural checker and self-healing loop
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Request classifier keyword tables
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Tool selection settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "openai/gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_request_timeout() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("providers", &self.providers)
            .field("project", &self.project)
            .field("validator", &self.validator)
            .field("classifier", &self.classifier)
            .field("agent", &self.agent)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// Layout of the site project whose components are edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root; the checker runs here
    #[serde(default = "default_project_root")]
    pub root: String,

    /// Component directory, relative to the root
    #[serde(default = "default_components_dir")]
    pub components_dir: String,

    /// Page that imports and places the components, relative to the root
    #[serde(default = "default_page_file")]
    pub page_file: String,

    /// Component file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Module prefix used when importing a new component into the page
    #[serde(default = "default_import_prefix")]
    pub import_prefix: String,
}

fn default_project_root() -> String {
    ".".into()
}
fn default_components_dir() -> String {
    "src/components".into()
}
fn default_page_file() -> String {
    "src/app/page.tsx".into()
}
fn default_extension() -> String {
    "tsx".into()
}
fn default_import_prefix() -> String {
    "@/components".into()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_project_root(),
            components_dir: default_components_dir(),
            page_file: default_page_file(),
            extension: default_extension(),
            import_prefix: default_import_prefix(),
        }
    }
}

impl ProjectConfig {
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

/// External structural checker and the self-healing loop around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// When false, handlers skip validation entirely
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Checker executable
    #[serde(default = "default_checker_program")]
    pub program: String,

    /// Arguments; the scoped config path is appended last
    #[serde(default = "default_checker_args")]
    pub args: Vec<String>,

    /// Project checker config the scoped config extends, relative to the root
    #[serde(default = "default_base_config")]
    pub base_config: String,

    /// Any of these in stdout/stderr marks the document as failing
    #[serde(default = "default_error_markers")]
    pub error_markers: Vec<String>,

    /// Upper bound for one checker run, in seconds
    #[serde(default = "default_checker_timeout")]
    pub timeout_secs: u64,

    /// Temperature for fix requests
    #[serde(default = "default_fix_temperature")]
    pub fix_temperature: f32,

    /// In-place edits log and continue when fixes run out; creation never does
    #[serde(default = "default_true")]
    pub soft_fail_edits: bool,
}

fn default_checker_program() -> String {
    "npx".into()
}
fn default_checker_args() -> Vec<String> {
    ["tsc", "--noEmit", "--pretty", "false", "-p"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_base_config() -> String {
    "tsconfig.json".into()
}
fn default_error_markers() -> Vec<String> {
    vec!["error TS".into()]
}
fn default_checker_timeout() -> u64 {
    120
}
fn default_fix_temperature() -> f32 {
    0.1
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_checker_program(),
            args: default_checker_args(),
            base_config: default_base_config(),
            error_markers: default_error_markers(),
            timeout_secs: default_checker_timeout(),
            fix_temperature: default_fix_temperature(),
            soft_fail_edits: true,
        }
    }
}

/// Keyword tables deciding whether an instruction is a visual request.
///
/// These are policy, not contract: "look" in particular over-triggers
/// layout classification, and deployments are expected to tune the lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_image_keywords")]
    pub image_keywords: Vec<String>,

    #[serde(default = "default_layout_keywords")]
    pub layout_keywords: Vec<String>,
}

fn default_image_keywords() -> Vec<String> {
    [
        "image",
        "images",
        "picture",
        "photo",
        "photograph",
        "img",
        "logo",
        "icon",
        "illustration",
        "screenshot",
        "background image",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_layout_keywords() -> Vec<String> {
    [
        "layout",
        "wireframe",
        "mockup",
        "mock-up",
        "sketch",
        "design",
        "redesign",
        "look",
        "arrangement",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            image_keywords: default_image_keywords(),
            layout_keywords: default_layout_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Decisions below this confidence are reported as provisional
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

fn default_confidence_threshold() -> f32 {
    0.7
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    42618
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `./pagewright.toml`, falling back to
    /// `~/.pagewright/config.toml`.
    ///
    /// Also checks environment variables for API keys:
    /// - `PAGEWRIGHT_API_KEY` (highest priority)
    /// - `OPENROUTER_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let local = PathBuf::from(PROJECT_CONFIG_FILE);
        let path = if local.exists() {
            local
        } else {
            Self::config_dir().join("config.toml")
        };
        Self::load_with_env(&path)
    }

    /// Load from an explicit path and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("PAGEWRIGHT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("PAGEWRIGHT_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("PAGEWRIGHT_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the user-level configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".pagewright")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.validator.fix_temperature) {
            return Err(ConfigError::ValidationError(
                "validator.fix_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 || self.validator.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than zero".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.agent.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "agent.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.project.extension.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "project.extension must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            providers: HashMap::new(),
            project: ProjectConfig::default(),
            validator: ValidatorConfig::default(),
            classifier: ClassifierConfig::default(),
            agent: AgentSettings::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openrouter");
        assert_eq!(config.gateway.port, 42618);
        assert!(config.validator.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.project.components_dir, "src/components");
        assert_eq!(parsed.validator.args, config.validator.args);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/pagewright.toml")).unwrap();
        assert_eq!(config.default_provider, "openrouter");
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
default_model = "gpt-4o-mini"

[project]
components_dir = "components"

[classifier]
layout_keywords = ["layout"]
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.project.components_dir, "components");
        assert_eq!(config.project.extension, "tsx");
        assert_eq!(config.classifier.layout_keywords, vec!["layout".to_string()]);
        assert!(config.classifier.image_keywords.contains(&"image".to_string()));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "default_model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("openrouter"));
        assert!(toml_str.contains("src/components"));
    }
}
