#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bwtfs_client::{ClientConfig, FsClient};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const CHUNK: usize = 1024;

/// In-memory stand-in for the filesystem service.
#[derive(Default)]
pub struct MockFs {
    pub sessions: HashMap<String, Vec<u8>>,
    pub files: HashMap<String, Vec<u8>>,
    /// Every chunk request seen, as (session id, chunk index, declared file size).
    pub received: Vec<(String, u64, u64)>,
    pub reject_chunk: Option<u64>,
    pub omit_status: bool,
    pub fail_free_size: bool,
    pub capacity: u64,
}

pub type SharedFs = Arc<Mutex<MockFs>>;

pub fn mock_fs() -> SharedFs {
    Arc::new(Mutex::new(MockFs {
        capacity: 64 * 1024 * 1024,
        ..Default::default()
    }))
}

pub async fn spawn_server(fs: SharedFs) -> String {
    let app = Router::new()
        .route("/system_size", get(system_size))
        .route("/free_size", get(free_size))
        .route("/upload", post(upload))
        .route("/delete/:token", delete(delete_file))
        .route("/:token", get(download))
        .with_state(fs);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn setup() -> (SharedFs, FsClient) {
    let fs = mock_fs();
    let base_url = spawn_server(fs.clone()).await;
    let client = FsClient::connect(ClientConfig {
        base_url,
        chunk_size: CHUNK,
        ..Default::default()
    })
    .unwrap();
    (fs, client)
}

pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn used(fs: &MockFs) -> u64 {
    fs.files.values().map(|f| f.len() as u64).sum()
}

async fn system_size(State(fs): State<SharedFs>) -> Json<serde_json::Value> {
    let fs = fs.lock().unwrap();
    Json(json!({ "system_size": fs.capacity }))
}

async fn free_size(State(fs): State<SharedFs>) -> Response {
    let fs = fs.lock().unwrap();
    if fs.fail_free_size {
        return (StatusCode::INTERNAL_SERVER_ERROR, "bitmap unavailable").into_response();
    }
    Json(json!({ "free_size": fs.capacity - used(&fs) })).into_response()
}

async fn upload(State(fs): State<SharedFs>, headers: HeaderMap, body: Bytes) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    let number = |name: &str| header(name).and_then(|v| v.parse::<u64>().ok());

    let (Some(file_id), Some(index), Some(total), Some(size)) = (
        header("x-file-id"),
        number("x-chunk-index"),
        number("x-total-chunks"),
        number("x-file-size"),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": "File ID is required"})),
        )
            .into_response();
    };

    let mut fs = fs.lock().unwrap();
    fs.received.push((file_id.clone(), index, size));

    if fs.reject_chunk == Some(index) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "message": "chunk write failed"})),
        )
            .into_response();
    }

    fs.sessions
        .entry(file_id.clone())
        .or_default()
        .extend_from_slice(&body);

    if index + 1 < total {
        return Json(json!({"status": "chunk_received", "chunk": index})).into_response();
    }

    let data = fs.sessions.remove(&file_id).unwrap_or_default();
    let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    fs.files.insert(token.clone(), data);

    if fs.omit_status {
        return Json(json!({"token": token})).into_response();
    }
    Json(json!({
        "status": "success",
        "token": token,
        "message": "File uploaded successfully"
    }))
    .into_response()
}

async fn download(State(fs): State<SharedFs>, Path(token): Path<String>) -> Response {
    let fs = fs.lock().unwrap();
    match fs.files.get(&token) {
        Some(data) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

async fn delete_file(State(fs): State<SharedFs>, Path(token): Path<String>) -> Response {
    let mut fs = fs.lock().unwrap();
    match fs.files.remove(&token) {
        Some(_) => Json(json!({"status": "success", "message": "File deleted successfully"}))
            .into_response(),
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}
