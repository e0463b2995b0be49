use crate::error::ClientError;
use crate::models::{AccessToken, CompletionPayload, FileBlob};
use crate::services::chunk_planner::{ChunkPlan, ChunkRange};
use crate::services::progress::ProgressObserver;
use crate::services::transport::{Transport, TransportRequest, TransportResponse};
use bytes::Bytes;
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use uuid::Uuid;

pub const HEADER_FILE_ID: &str = "X-File-Id";
pub const HEADER_CHUNK_INDEX: &str = "X-Chunk-Index";
pub const HEADER_TOTAL_CHUNKS: &str = "X-Total-Chunks";
pub const HEADER_FILE_SIZE: &str = "X-File-Size";
pub const HEADER_FILE_TYPE: &str = "X-File-Type";

const UPLOAD_PATH: &str = "/upload";
const STATUS_SUCCESS: &str = "success";

/// Session metadata carried by every chunk request. The service keeps no
/// per-connection state and rebuilds the session from these fields each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub session_id: Uuid,
    pub index: u64,
    pub total_chunks: u64,
    pub file_size: u64,
}

impl ChunkMetadata {
    pub fn into_request(self, payload: Bytes, file_type: &str) -> TransportRequest {
        TransportRequest::post(UPLOAD_PATH, payload)
            .header("Content-Type", mime::APPLICATION_OCTET_STREAM.as_ref())
            .header(HEADER_FILE_ID, self.session_id.to_string())
            .header(HEADER_CHUNK_INDEX, self.index.to_string())
            .header(HEADER_TOTAL_CHUNKS, self.total_chunks.to_string())
            .header(HEADER_FILE_SIZE, self.file_size.to_string())
            .header(HEADER_FILE_TYPE, file_type)
    }
}

/// One upload attempt. Never reused: a failed upload must be re-driven with
/// a fresh session.
#[derive(Debug)]
pub struct UploadSession {
    pub id: Uuid,
    pub plan: ChunkPlan,
}

impl UploadSession {
    pub fn new(plan: ChunkPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan,
        }
    }

    pub fn metadata(&self, index: u64) -> ChunkMetadata {
        ChunkMetadata {
            session_id: self.id,
            index,
            total_chunks: self.plan.total_chunks(),
            file_size: self.plan.file_size(),
        }
    }
}

/// Upload progress as a linear state machine. A token exists only in `Done`.
#[derive(Debug)]
pub enum UploadState {
    /// Next chunk to send is not the last one.
    Sending(u64),
    /// Next chunk to send is the last one; its reply carries the token.
    SendingFinal(u64),
    Done(AccessToken),
    Failed(ClientError),
}

impl UploadState {
    pub fn start(plan: &ChunkPlan) -> Self {
        Self::at(0, plan)
    }

    fn at(index: u64, plan: &ChunkPlan) -> Self {
        if plan.is_last(index) {
            UploadState::SendingFinal(index)
        } else {
            UploadState::Sending(index)
        }
    }

    /// Index of the chunk that still has to be sent, if any.
    pub fn pending_index(&self) -> Option<u64> {
        match self {
            UploadState::Sending(i) | UploadState::SendingFinal(i) => Some(*i),
            UploadState::Done(_) | UploadState::Failed(_) => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, UploadState::SendingFinal(_))
    }

    /// An intermediate chunk was acknowledged.
    pub fn advance(self, plan: &ChunkPlan) -> Self {
        match self {
            UploadState::Sending(i) => Self::at(i + 1, plan),
            UploadState::SendingFinal(i) => UploadState::Failed(ClientError::Protocol(format!(
                "final chunk {} must be completed, not advanced",
                i
            ))),
            terminal => terminal,
        }
    }

    /// The final chunk was acknowledged with `body`.
    pub fn complete(self, body: &[u8]) -> Self {
        match self {
            UploadState::SendingFinal(_) => match parse_completion(body) {
                Ok(token) => UploadState::Done(token),
                Err(e) => UploadState::Failed(e),
            },
            UploadState::Sending(i) => UploadState::Failed(ClientError::Protocol(format!(
                "chunk {} is not the final chunk",
                i
            ))),
            terminal => terminal,
        }
    }

    pub fn fail(self, error: ClientError) -> Self {
        match self {
            UploadState::Done(_) | UploadState::Failed(_) => self,
            _ => UploadState::Failed(error),
        }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            UploadState::Done(token) => Some(token),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<AccessToken, ClientError> {
        match self {
            UploadState::Done(token) => Ok(token),
            UploadState::Failed(e) => Err(e),
            UploadState::Sending(i) | UploadState::SendingFinal(i) => Err(ClientError::Protocol(
                format!("upload stopped before chunk {} was sent", i),
            )),
        }
    }
}

/// Extracts the access token from the last chunk's reply.
pub fn parse_completion(body: &[u8]) -> Result<AccessToken, ClientError> {
    let payload: CompletionPayload = serde_json::from_slice(body)
        .map_err(|e| ClientError::Protocol(format!("unparseable completion payload: {}", e)))?;

    match payload.status.as_deref() {
        None => Err(ClientError::Protocol(
            "completion payload is missing 'status'".to_string(),
        )),
        Some(STATUS_SUCCESS) => match payload.token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(ClientError::Protocol(
                "completion payload reports success without a token".to_string(),
            )),
        },
        Some(other) => Err(ClientError::UploadRejected(
            payload
                .message
                .unwrap_or_else(|| format!("service reported status '{}'", other)),
        )),
    }
}

pub struct ChunkedUploader {
    transport: Arc<dyn Transport>,
    chunk_size: u64,
}

impl ChunkedUploader {
    pub fn new(transport: Arc<dyn Transport>, chunk_size: usize) -> Self {
        Self {
            transport,
            chunk_size: chunk_size as u64,
        }
    }

    /// Sends `blob` chunk by chunk and returns the token issued for it.
    ///
    /// Chunks go out strictly in index order with one request in flight.
    /// The first rejected chunk aborts the upload; nothing is retried.
    pub async fn upload(
        &self,
        blob: &FileBlob,
        observer: &dyn ProgressObserver,
    ) -> Result<AccessToken, ClientError> {
        let plan = ChunkPlan::new(blob.size, self.chunk_size)?;
        let mut file = File::open(&blob.path)
            .await
            .map_err(|_| ClientError::NotFound(blob.path.clone()))?;
        let session = UploadSession::new(plan);
        let file_type = blob.content_type.as_deref().unwrap_or("");

        tracing::info!(
            "Uploading {} ({} bytes) in {} chunk(s), session {}",
            blob.name,
            plan.file_size(),
            plan.total_chunks(),
            session.id
        );

        let mut state = UploadState::start(&plan);
        while let Some(index) = state.pending_index() {
            let sent = match plan.range(index) {
                Some(range) => {
                    self.send_chunk(&mut file, &session, range, file_type)
                        .await
                }
                None => Err(ClientError::Protocol(format!(
                    "chunk {} is outside the plan",
                    index
                ))),
            };

            state = match sent {
                Err(e) => state.fail(e),
                Ok(response) => {
                    observer.chunk_uploaded(index, plan.total_chunks());
                    if state.is_final() {
                        match response.bytes().await {
                            Ok(body) => state.complete(&body),
                            Err(e) => state.fail(e),
                        }
                    } else {
                        // Drain so the connection can be reused.
                        if let Err(e) = response.bytes().await {
                            tracing::debug!("Ignoring unread body of chunk {}: {}", index, e);
                        }
                        state.advance(&plan)
                    }
                }
            };
        }

        match &state {
            UploadState::Done(token) => {
                tracing::info!("Upload of {} completed, token {}", blob.name, token)
            }
            UploadState::Failed(e) => {
                tracing::warn!("Upload of {} failed (session {}): {}", blob.name, session.id, e)
            }
            _ => {}
        }
        state.into_result()
    }

    async fn send_chunk(
        &self,
        file: &mut File,
        session: &UploadSession,
        range: ChunkRange,
        file_type: &str,
    ) -> Result<TransportResponse, ClientError> {
        let payload = read_range(file, range).await?;
        let request = session.metadata(range.index).into_request(payload, file_type);

        tracing::debug!(
            "Sending chunk {}/{} [{}..{})",
            range.index + 1,
            session.plan.total_chunks(),
            range.start,
            range.end
        );
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let status = response.status;
            return Err(ClientError::ChunkRejected {
                index: range.index,
                status,
                message: response.server_message().await,
            });
        }
        Ok(response)
    }
}

async fn read_range(file: &mut File, range: ChunkRange) -> Result<Bytes, ClientError> {
    file.seek(SeekFrom::Start(range.start)).await?;
    let mut buf = vec![0u8; range.len() as usize];
    file.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}
