use crate::error::ClientError;
use crate::models::ErrorBody;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::BoxStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Path relative to the service root, starting with `/`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl TransportRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Bytes) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response body delivered incrementally. Finite and single-pass.
pub type BodyStream = BoxStream<'static, Result<Bytes, ClientError>>;

pub struct TransportResponse {
    pub status: u16,
    /// Declared body length, when the service sent one.
    pub content_length: Option<u64>,
    pub body: BodyStream,
}

impl TransportResponse {
    /// The service answers every accepted call with 200; any other status,
    /// other 2xx codes included, is a refusal.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Drains the whole body into memory. Only used for small JSON replies.
    pub async fn bytes(self) -> Result<Bytes, ClientError> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(frame) = body.next().await {
            buf.extend_from_slice(&frame?);
        }
        Ok(buf.freeze())
    }

    /// Best-effort diagnostic message from an error response.
    ///
    /// Prefers `message` or `error` from a JSON body and falls back to the
    /// raw text. Never fails: an unreadable body yields an empty message.
    pub async fn server_message(self) -> String {
        let body = match self.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read error body: {}", e);
                return String::new();
            }
        };
        if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(&body) {
            if let Some(msg) = parsed.message.or(parsed.error) {
                return msg;
            }
        }
        String::from_utf8_lossy(&body).trim().to_string()
    }
}

/// Request/response capability the protocol logic is written against.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One canned reply. `frames` become the body stream; an `Err` frame
    /// simulates a connection cut mid-body.
    pub struct Reply {
        pub status: u16,
        pub content_length: Option<u64>,
        pub frames: Vec<Result<Bytes, String>>,
    }

    impl Reply {
        pub fn ok(body: impl Into<Bytes>) -> Self {
            let body = body.into();
            Self {
                status: 200,
                content_length: Some(body.len() as u64),
                frames: vec![Ok(body)],
            }
        }

        pub fn json(value: serde_json::Value) -> Self {
            Self::ok(value.to_string())
        }

        pub fn status(status: u16, body: &str) -> Self {
            Self {
                status,
                content_length: Some(body.len() as u64),
                frames: vec![Ok(Bytes::copy_from_slice(body.as_bytes()))],
            }
        }

        pub fn stream(frames: Vec<Result<Bytes, String>>, content_length: Option<u64>) -> Self {
            Self {
                status: 200,
                content_length,
                frames,
            }
        }
    }

    /// Replays queued replies in order and records every request it sees.
    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Reply, String>>>,
        pub requests: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, reply: Reply) -> &Self {
            self.replies.lock().unwrap().push_back(Ok(reply));
            self
        }

        pub fn push_connect_error(&self, reason: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(reason.to_string()));
            self
        }

        pub fn recorded(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, ClientError> {
            self.requests.lock().unwrap().push(request);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted reply left".to_string()))
                .map_err(ClientError::Transport)?;

            let frames = reply
                .frames
                .into_iter()
                .map(|f| f.map_err(ClientError::Transport));
            Ok(TransportResponse {
                status: reply.status,
                content_length: reply.content_length,
                body: futures::stream::iter(frames).boxed(),
            })
        }
    }
}
