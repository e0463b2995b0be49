use crate::error::ClientError;
use crate::services::transport::{Transport, TransportRequest};
use crate::utils::validation::{encode_token_segment, validate_token};
use std::sync::Arc;

pub struct FileDeleter {
    transport: Arc<dyn Transport>,
}

impl FileDeleter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn delete(&self, token: &str) -> Result<(), ClientError> {
        validate_token(token)?;
        let path = format!("/delete/{}", encode_token_segment(token));

        let response = self.transport.send(TransportRequest::delete(path)).await?;
        if !response.is_success() {
            let status = response.status;
            let message = response.server_message().await;
            tracing::warn!("Delete rejected with status {}: {}", status, message);
            return Err(ClientError::DeleteRejected { status, message });
        }

        tracing::info!("Deleted file for token {}", token);
        Ok(())
    }
}
