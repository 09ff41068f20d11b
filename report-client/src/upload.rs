use crate::error::ClientError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default upload ceiling, 10 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const EMPTY_FILE_MESSAGE: &str = "The selected file is empty";

/// Where the bytes of a selected file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A user-selected file. Bytes are only read when previewing or analyzing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    /// MIME type as declared by the picker, not sniffed.
    pub mime_type: String,
    pub size: u64,
    source: FileSource,
}

impl ImageFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Handle to a file on disk; only its metadata is read here.
    pub async fn from_path(
        path: impl AsRef<Path>,
        mime_type: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ClientError::Read(e.to_string()))?;

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            mime_type: mime_type.into(),
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Read the whole file into memory.
    pub async fn read(&self) -> Result<Vec<u8>, ClientError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
            FileSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
                ClientError::Read(e.to_string())
            }),
        }
    }

    /// Read the file as a `data:<mime>;base64,<payload>` URL.
    pub async fn read_as_data_url(&self) -> Result<String, ClientError> {
        let bytes = self.read().await?;
        Ok(to_data_url(&self.mime_type, &bytes))
    }
}

pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// The base64 payload after the first comma of a data URL.
pub fn strip_data_url_prefix(data_url: &str) -> Option<&str> {
    data_url.split_once(',').map(|(_, payload)| payload)
}

/// Type and size rules applied on selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn validate(&self, file: &ImageFile) -> Result<(), ClientError> {
        if !file.mime_type.starts_with("image/") {
            return Err(ClientError::Validation(
                "Please select a valid image file".to_string(),
            ));
        }

        if file.size == 0 {
            return Err(ClientError::Validation(EMPTY_FILE_MESSAGE.to_string()));
        }

        if file.size > self.max_bytes {
            return Err(ClientError::Validation(format!(
                "File size must be less than {}",
                format_limit(self.max_bytes)
            )));
        }

        Ok(())
    }
}

fn format_limit(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{} bytes", bytes)
    }
}
