//! Evidence storage contract
//!
//! The uploaded artifact is opaque to the pipeline: it is handed to an
//! `EvidenceStore` and only the returned URL travels further.

use crate::error::PipelineError;
use crate::types::{EvidenceMeta, ProjectId};
use async_trait::async_trait;

/// Binary evidence artifact to store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceUpload {
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl EvidenceUpload {
    /// Video upload with the default content type
    #[must_use]
    pub fn video(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: EvidenceMeta::default().content_type,
            bytes,
        }
    }

    /// With content type
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Metadata sent along with verification requests
    #[must_use]
    pub fn meta(&self) -> EvidenceMeta {
        EvidenceMeta {
            content_type: self.content_type.clone(),
            file_name: Some(self.file_name.clone()),
            size_bytes: u64::try_from(self.bytes.len()).ok(),
        }
    }
}

/// Binary asset storage returning an addressable URL
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Store `upload` for `project_id`
    ///
    /// # Errors
    /// `PipelineError::Evidence` when the asset cannot be stored
    async fn put(&self, project_id: &ProjectId, upload: &EvidenceUpload) -> Result<String, PipelineError>;
}
