//! Component documents on disk.
//!
//! Target identifiers map to `<components_dir>/<Name>.<ext>` under the
//! project root. Every read and write goes straight to the filesystem; the
//! file is the only copy of a component.

use pagewright_config::ProjectConfig;
use pagewright_core::AgentError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct DocumentStore {
    root: PathBuf,
    components_dir: String,
    page_file: String,
    extension: String,
    import_prefix: String,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>, project: &ProjectConfig) -> Self {
        Self {
            root: root.into(),
            components_dir: project.components_dir.trim_end_matches('/').to_string(),
            page_file: project.page_file.clone(),
            extension: project.extension.trim_start_matches('.').to_string(),
            import_prefix: project.import_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(project: &ProjectConfig) -> Self {
        Self::new(project.root_path(), project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn import_prefix(&self) -> &str {
        &self.import_prefix
    }

    /// Strip a trailing `.<ext>` and reject anything that could escape the
    /// component directory.
    pub fn canonical_name(&self, name: &str) -> Result<String, AgentError> {
        let trimmed = name.trim();
        let suffix = format!(".{}", self.extension);
        let bare = trimmed.strip_suffix(suffix.as_str()).unwrap_or(trimmed);

        if bare.is_empty() {
            return Err(AgentError::document(name, "empty component identifier"));
        }
        if bare.contains('/') || bare.contains('\\') || bare.contains("..") {
            return Err(AgentError::document(
                name,
                "component identifiers may not contain path separators or '..'",
            ));
        }
        Ok(bare.to_string())
    }

    /// Path of the component file relative to the project root.
    pub fn relative_path(&self, name: &str) -> Result<String, AgentError> {
        let name = self.canonical_name(name)?;
        Ok(format!("{}/{name}.{}", self.components_dir, self.extension))
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, AgentError> {
        Ok(self.root.join(self.relative_path(name)?))
    }

    pub async fn exists(&self, name: &str) -> Result<bool, AgentError> {
        let path = self.path_for(name)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    pub async fn read(&self, name: &str) -> Result<String, AgentError> {
        let relative = self.relative_path(name)?;
        tokio::fs::read_to_string(self.root.join(&relative))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AgentError::document(&relative, "component file does not exist")
                }
                _ => AgentError::document(&relative, e),
            })
    }

    /// Write the whole component file, creating the directory if needed.
    pub async fn write(&self, name: &str, content: &str) -> Result<String, AgentError> {
        let relative = self.relative_path(name)?;
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AgentError::document(&relative, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AgentError::document(&relative, e))?;
        debug!(path = %relative, bytes = content.len(), "Component written");
        Ok(relative)
    }

    pub async fn remove(&self, name: &str) -> Result<String, AgentError> {
        let relative = self.relative_path(name)?;
        tokio::fs::remove_file(self.root.join(&relative))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AgentError::document(&relative, "component file does not exist")
                }
                _ => AgentError::document(&relative, e),
            })?;
        debug!(path = %relative, "Component removed");
        Ok(relative)
    }

    /// Known target identifiers: the stems of every component file, sorted.
    /// A missing component directory means no targets.
    pub async fn list_targets(&self) -> Result<Vec<String>, AgentError> {
        let dir = self.root.join(&self.components_dir);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AgentError::document(&self.components_dir, e)),
        };

        let mut targets = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AgentError::document(&self.components_dir, e))?
        {
            let path = entry.path();
            let matches_ext = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));
            if !matches_ext {
                continue;
            }
            if let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned())
                && !stem.starts_with('.')
            {
                targets.push(stem);
            }
        }
        targets.sort();
        Ok(targets)
    }

    pub fn page_relative(&self) -> &str {
        &self.page_file
    }

    /// The page file, or `None` when the project has none.
    pub async fn read_page(&self) -> Result<Option<String>, AgentError> {
        match tokio::fs::read_to_string(self.root.join(&self.page_file)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AgentError::document(&self.page_file, e)),
        }
    }

    pub async fn write_page(&self, content: &str) -> Result<(), AgentError> {
        tokio::fs::write(self.root.join(&self.page_file), content)
            .await
            .map_err(|e| AgentError::document(&self.page_file, e))
    }
}
