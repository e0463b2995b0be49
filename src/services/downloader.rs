use crate::error::ClientError;
use crate::services::progress::ProgressObserver;
use crate::services::transport::{BodyStream, Transport, TransportRequest, TransportResponse};
use crate::utils::validation::{encode_token_segment, validate_token};
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// An accepted download whose body has not been consumed yet.
///
/// Yields the body as increments of at most `increment` bytes, in the order
/// the service sent them. Single pass: once drained it cannot be restarted.
pub struct DownloadStream {
    body: BodyStream,
    pending: Bytes,
    increment: usize,
    expected: Option<u64>,
}

impl DownloadStream {
    fn new(response: TransportResponse, increment: usize) -> Self {
        Self {
            expected: response.content_length,
            body: response.body,
            pending: Bytes::new(),
            increment: increment.max(1),
        }
    }

    pub async fn next_increment(&mut self) -> Option<Result<Bytes, ClientError>> {
        loop {
            if !self.pending.is_empty() {
                let take = self.pending.len().min(self.increment);
                return Some(Ok(self.pending.split_to(take)));
            }
            match self.body.next().await {
                Some(Ok(frame)) => self.pending = frame,
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            }
        }
    }

    /// Appends every increment to `sink` and reports the running total.
    ///
    /// On failure the bytes already written stay in the sink; the error
    /// carries the exact offset the sink accepted, partial writes included.
    pub async fn write_to<W>(
        mut self,
        sink: &mut W,
        observer: &dyn ProgressObserver,
    ) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written: u64 = 0;
        while let Some(increment) = self.next_increment().await {
            let bytes = increment.map_err(|e| ClientError::DownloadInterrupted {
                written,
                reason: e.to_string(),
            })?;
            let mut offset = 0;
            while offset < bytes.len() {
                let accepted = match sink.write(&bytes[offset..]).await {
                    Ok(0) => Err(std::io::Error::from(std::io::ErrorKind::WriteZero)),
                    other => other,
                }
                .map_err(|e| ClientError::DownloadInterrupted {
                    written,
                    reason: format!("sink write failed: {}", e),
                })?;
                offset += accepted;
                written += accepted as u64;
            }
            observer.bytes_downloaded(written, self.expected);
        }

        sink.flush()
            .await
            .map_err(|e| ClientError::DownloadInterrupted {
                written,
                reason: format!("sink flush failed: {}", e),
            })?;

        match self.expected {
            Some(expected) if expected != written => Err(ClientError::TruncatedDownload {
                expected,
                received: written,
            }),
            _ => Ok(written),
        }
    }
}

pub struct StreamingDownloader {
    transport: Arc<dyn Transport>,
    chunk_size: usize,
}

impl StreamingDownloader {
    pub fn new(transport: Arc<dyn Transport>, chunk_size: usize) -> Self {
        Self {
            transport,
            chunk_size,
        }
    }

    /// Requests the file behind `token`. A rejection is reported here,
    /// before any sink exists.
    pub async fn open(&self, token: &str) -> Result<DownloadStream, ClientError> {
        validate_token(token)?;
        let path = format!("/{}", encode_token_segment(token));

        let response = self.transport.send(TransportRequest::get(path)).await?;
        if !response.is_success() {
            let status = response.status;
            let message = response.server_message().await;
            tracing::warn!("Download rejected with status {}: {}", status, message);
            return Err(ClientError::DownloadRejected { status, message });
        }

        tracing::debug!(
            "Download accepted, declared length: {:?}",
            response.content_length
        );
        Ok(DownloadStream::new(response, self.chunk_size))
    }

    pub async fn download<W>(
        &self,
        token: &str,
        sink: &mut W,
        observer: &dyn ProgressObserver,
    ) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let stream = self.open(token).await?;
        let written = stream.write_to(sink, observer).await?;
        tracing::info!("Downloaded {} bytes", written);
        Ok(written)
    }
}
