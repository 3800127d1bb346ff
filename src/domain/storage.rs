use super::errors::StorageError;
use std::sync::Arc;

/// Identifiers returned by remote storage for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    // ---
    pub file_id: String,
    pub web_view_link: String,
    pub web_content_link: Option<String>,
}

/// Remote object storage for attendance photos.
#[async_trait::async_trait]
pub trait PhotoStorage: Send + Sync {
    // ---
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<StoredFile, StorageError>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError>;
}

pub type PhotoStoragePtr = Arc<dyn PhotoStorage>;
