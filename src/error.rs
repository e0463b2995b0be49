use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("File not found or not readable: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chunk {index} rejected with status {status}: {message}")]
    ChunkRejected {
        index: u64,
        status: u16,
        message: String,
    },

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Download rejected with status {status}: {message}")]
    DownloadRejected { status: u16, message: String },

    /// The stream ended before the declared `Content-Length` was reached.
    #[error("Truncated download: expected {expected} bytes, received {received}")]
    TruncatedDownload { expected: u64, received: u64 },

    /// The stream or the sink failed mid-transfer. Bytes up to `written` are
    /// already in the sink and are left there.
    #[error("Download interrupted after {written} bytes: {reason}")]
    DownloadInterrupted { written: u64, reason: String },

    #[error("Delete rejected with status {status}: {message}")]
    DeleteRejected { status: u16, message: String },

    #[error("System info unavailable: {0}")]
    InfoUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Byte offset reached by a failed download, if the failure happened
    /// after the sink started receiving data.
    pub fn bytes_written(&self) -> Option<u64> {
        match self {
            ClientError::DownloadInterrupted { written, .. } => Some(*written),
            ClientError::TruncatedDownload { received, .. } => Some(*received),
            _ => None,
        }
    }
}
