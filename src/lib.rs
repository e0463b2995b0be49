//! Client for the BwtFS filesystem service.
//!
//! Files are uploaded as a sequence of fixed-size chunks correlated by a
//! per-upload session id; the reply to the last chunk carries the access
//! token used to download or delete the file later.

pub mod client;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

pub use client::FsClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use models::{AccessToken, FileBlob, SystemInfo};
pub use services::progress::{NoOpProgress, ProgressObserver, TracingProgress};
