use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::services::transport::{Method, Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::info;

/// `Transport` over HTTP(S) with a pooled `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("{} {}: {}", method_name(request.method), url, e)))?;

        let status = response.status().as_u16();
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map_err(|e| ClientError::Transport(e.to_string()))
            .boxed();

        Ok(TransportResponse {
            status,
            content_length,
            body,
        })
    }
}

fn method_name(method: Method) -> &'static str {
    match method {
        Method::Get => "GET",
        Method::Post => "POST",
        Method::Delete => "DELETE",
    }
}

pub fn setup_transport(config: &ClientConfig) -> Result<Arc<HttpTransport>, ClientError> {
    config.validate()?;

    let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

    info!("Filesystem service: {}", config.normalized_base_url());
    Ok(Arc::new(HttpTransport::new(
        client,
        config.normalized_base_url(),
    )))
}
