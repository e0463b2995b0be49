pub mod chunk_planner;
pub mod deleter;
pub mod downloader;
pub mod progress;
pub mod system_info;
pub mod transport;
pub mod uploader;
