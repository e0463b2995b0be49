use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::infrastructure::http::setup_transport;
use crate::models::{AccessToken, FileBlob, SystemInfo};
use crate::services::deleter::FileDeleter;
use crate::services::downloader::StreamingDownloader;
use crate::services::progress::ProgressObserver;
use crate::services::system_info::SystemInfoQuery;
use crate::services::transport::Transport;
use crate::services::uploader::ChunkedUploader;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Entry point for the four operations offered by the filesystem service.
///
/// Cheap to share: every operation builds its own session state, so
/// independent calls may run concurrently on one client.
#[derive(Clone)]
pub struct FsClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl FsClient {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    /// Builds a client over HTTP from `config`.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = setup_transport(&config)?;
        Self::new(transport, config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn info(&self) -> Result<SystemInfo, ClientError> {
        SystemInfoQuery::new(self.transport.clone()).fetch().await
    }

    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        observer: &dyn ProgressObserver,
    ) -> Result<AccessToken, ClientError> {
        let blob = FileBlob::inspect(path).await?;
        ChunkedUploader::new(self.transport.clone(), self.config.chunk_size)
            .upload(&blob, observer)
            .await
    }

    /// Downloads into a file at `output`.
    ///
    /// The file and its missing parent directories are created only after
    /// the service accepted the request. On a mid-stream failure the partial
    /// file is left on disk for the caller to keep or remove.
    pub async fn download(
        &self,
        token: &str,
        output: impl AsRef<Path>,
        observer: &dyn ProgressObserver,
    ) -> Result<u64, ClientError> {
        let output = output.as_ref();
        let stream = self.downloader().open(token).await?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::File::create(output).await?;
        let mut sink = BufWriter::with_capacity(self.config.chunk_size, file);

        let result = stream.write_to(&mut sink, observer).await;
        if let Err(e) = &result {
            // Buffered bytes are part of the reported offset; push them to disk.
            if let Err(flush_err) = sink.flush().await {
                tracing::warn!("Failed to flush partial download after {}: {}", e, flush_err);
            }
        }
        let written = result?;
        tracing::info!("Saved {} bytes to {}", written, output.display());
        Ok(written)
    }

    /// Downloads into an arbitrary sink such as stdout.
    pub async fn download_to<W>(
        &self,
        token: &str,
        sink: &mut W,
        observer: &dyn ProgressObserver,
    ) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.downloader().download(token, sink, observer).await
    }

    pub async fn delete(&self, token: &str) -> Result<(), ClientError> {
        FileDeleter::new(self.transport.clone()).delete(token).await
    }

    fn downloader(&self) -> StreamingDownloader {
        StreamingDownloader::new(self.transport.clone(), self.config.chunk_size)
    }
}
