//! Attachment encoding into `data:` URIs.
//!
//! The whole file is read into memory and base64-encoded in one piece, so
//! memory use grows with attachment size. An optional byte limit can be set
//! with [`FileEncoder::with_limit`]; by default there is none.
//!
//! Reads go through `tokio::fs`, which hands the blocking IO to tokio's
//! blocking pool while the caller suspends.

use std::path::{Path, PathBuf};

use base64::Engine;
use tokio::fs;

use crate::error::EncodingError;

/// MIME used in the data URI when the file declares none.
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file picked by the user and not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    name: String,
    mime: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            mime: mime.into(),
        }
    }

    /// Build a selection from a path on disk, guessing the MIME from the extension.
    ///
    /// An unknown extension yields an empty MIME, which classifies as a generic file.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or_default()
            .to_string();
        Self::new(path, name, mime)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileEncoder {
    limit: Option<u64>,
}

impl FileEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject attachments larger than `limit` bytes (`None` means unbounded).
    pub fn with_limit(limit: Option<u64>) -> Self {
        Self { limit }
    }

    /// Read `file` and return `data:<mime>;base64,<contents>`.
    pub async fn encode(&self, file: &SelectedFile) -> Result<String, EncodingError> {
        let read_error = |source| EncodingError::Read {
            name: file.name.clone(),
            source,
        };

        if let Some(limit) = self.limit {
            let size = fs::metadata(&file.path).await.map_err(read_error)?.len();
            if size > limit {
                return Err(EncodingError::TooLarge {
                    name: file.name.clone(),
                    size,
                    limit,
                });
            }
        }

        let bytes = fs::read(&file.path).await.map_err(read_error)?;
        Ok(data_uri(&file.mime, &bytes))
    }
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, encoded)
}
