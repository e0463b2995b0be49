use crate::error::ClientError;
use std::env;
use std::time::Duration;

/// Connection and transfer configuration for the filesystem service client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service (default: "http://localhost:9999")
    pub base_url: String,

    /// Upload chunk size and download read increment in bytes (default: 1 MB)
    pub chunk_size: usize,

    /// TCP connect timeout (default: 30 s)
    pub connect_timeout: Duration,

    /// Whole-request timeout. Unset by default so long downloads are not cut off.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            chunk_size: 1024 * 1024, // 1 MB
            connect_timeout: Duration::from_secs(30),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: env::var("BWTFS_URL").unwrap_or(default.base_url),

            chunk_size: env::var("BWTFS_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.chunk_size),

            connect_timeout: env::var("BWTFS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.connect_timeout),

            request_timeout: env::var("BWTFS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        }
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.chunk_size == 0 {
            return Err(ClientError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.normalized_base_url().is_empty() {
            return Err(ClientError::InvalidConfig(
                "base URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
