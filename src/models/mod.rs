use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Bytes inspected when sniffing a file's content type.
const SNIFF_LEN: u64 = 8192;

/// A local file about to be uploaded.
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub path: PathBuf,
    pub size: u64,
    pub name: String,
    /// MIME type detected from the leading bytes, if recognised.
    pub content_type: Option<String>,
}

impl FileBlob {
    /// Resolves `path` to an absolute regular file and captures its size.
    ///
    /// Missing, non-regular, or unreadable files all yield `NotFound`.
    pub async fn inspect(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let not_found = |_| ClientError::NotFound(path.to_path_buf());

        let absolute = tokio::fs::canonicalize(path).await.map_err(not_found)?;
        let metadata = tokio::fs::metadata(&absolute).await.map_err(not_found)?;
        if !metadata.is_file() {
            return Err(ClientError::NotFound(path.to_path_buf()));
        }

        let mut head = Vec::new();
        tokio::fs::File::open(&absolute)
            .await
            .map_err(not_found)?
            .take(SNIFF_LEN)
            .read_to_end(&mut head)
            .await?;
        let content_type = infer::get(&head).map(|kind| kind.mime_type().to_string());

        let name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: absolute,
            size: metadata.len(),
            name,
            content_type,
        })
    }
}

/// Opaque credential issued by the service once the last chunk of an upload
/// has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Capacity snapshot of the remote filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub total: u64,
    pub free: u64,
}

impl SystemInfo {
    /// Derived locally; the service never reports it.
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

/// Body of the response to the last chunk of an upload.
///
/// Every field is optional so that a missing `status` can be told apart from
/// an unparseable body.
#[derive(Debug, Deserialize)]
pub struct CompletionPayload {
    pub status: Option<String>,
    pub token: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SystemSizeResponse {
    pub system_size: u64,
}

#[derive(Debug, Deserialize)]
pub struct FreeSizeResponse {
    pub free_size: u64,
}

/// Error body shapes used by the service and proxies in front of it.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}
