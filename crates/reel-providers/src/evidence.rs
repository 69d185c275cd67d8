//! Local filesystem evidence store
//!
//! Artifacts land under `<root>/<projectId>/<millis>-<file>` and are
//! addressed by a `file://` URL.

use async_trait::async_trait;
use chrono::Utc;
use reel_core::{EvidenceStore, EvidenceUpload, PipelineError, ProjectId};
use std::path::{Path, PathBuf};

/// Name used when an upload carries no usable file name
const FALLBACK_FILE_NAME: &str = "evidence";

/// Evidence store writing to a local directory
#[derive(Debug, Clone)]
pub struct LocalEvidenceStore {
    root: PathBuf,
}

impl LocalEvidenceStore {
    /// Store rooted at `root` (created on first upload)
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Final path component of `name`, so uploads cannot escape their directory
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

#[async_trait]
impl EvidenceStore for LocalEvidenceStore {
    async fn put(&self, project_id: &ProjectId, upload: &EvidenceUpload) -> Result<String, PipelineError> {
        let dir = self.root.join(safe_file_name(project_id.as_str()));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::Evidence(format!("{}: {e}", dir.display())))?;

        let name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            safe_file_name(&upload.file_name)
        );
        let path = dir.join(name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| PipelineError::Evidence(format!("{}: {e}", path.display())))?;

        let absolute = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| PipelineError::Evidence(format!("{}: {e}", path.display())))?;
        tracing::info!(
            "Stored {} bytes of evidence for {} at {}",
            upload.bytes.len(),
            project_id,
            absolute.display()
        );
        Ok(format!("file://{}", absolute.display()))
    }
}
