use crate::error::ClientError;
use crate::models::{FreeSizeResponse, SystemInfo, SystemSizeResponse};
use crate::services::transport::{Transport, TransportRequest};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub struct SystemInfoQuery {
    transport: Arc<dyn Transport>,
}

impl SystemInfoQuery {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetches total and free capacity. Both sub-queries must succeed; any
    /// failure discards the other result.
    pub async fn fetch(&self) -> Result<SystemInfo, ClientError> {
        let total: SystemSizeResponse = self.get_json("/system_size").await?;
        let free: FreeSizeResponse = self.get_json("/free_size").await?;

        Ok(SystemInfo {
            total: total.system_size,
            free: free.free_size,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let unavailable = |reason: String| ClientError::InfoUnavailable(format!("{}: {}", path, reason));

        let response = self
            .transport
            .send(TransportRequest::get(path))
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if !response.is_success() {
            let status = response.status;
            let message = response.server_message().await;
            return Err(unavailable(format!("status {} {}", status, message)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| unavailable(format!("invalid payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::testing::{Reply, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_combines_both_queries() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push(Reply::json(json!({"system_size": 1048576})))
            .push(Reply::json(json!({"free_size": 524288})));

        let info = SystemInfoQuery::new(transport.clone()).fetch().await.unwrap();
        assert_eq!(info.total, 1048576);
        assert_eq!(info.free, 524288);
        assert_eq!(info.used(), 524288);

        let paths: Vec<String> = transport.recorded().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/system_size", "/free_size"]);
    }

    #[tokio::test]
    async fn test_fails_when_total_fails() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push(Reply::status(500, "boom"))
            .push(Reply::json(json!({"free_size": 1})));

        let err = SystemInfoQuery::new(transport).fetch().await.unwrap_err();
        assert!(matches!(err, ClientError::InfoUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fails_when_free_fails() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push(Reply::json(json!({"system_size": 100})))
            .push_connect_error("connection reset");

        let err = SystemInfoQuery::new(transport).fetch().await.unwrap_err();
        assert!(matches!(err, ClientError::InfoUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fails_on_malformed_payload() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push(Reply::json(json!({"system_size": 100})))
            .push(Reply::json(json!({"free": 1})));

        let err = SystemInfoQuery::new(transport).fetch().await.unwrap_err();
        assert!(matches!(err, ClientError::InfoUnavailable(m) if m.contains("/free_size")));
    }
}
