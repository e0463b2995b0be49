/// Receives transfer progress. Rendering is left to the implementor.
pub trait ProgressObserver: Send + Sync {
    /// Called once per acknowledged chunk, in index order.
    fn chunk_uploaded(&self, _index: u64, _total_chunks: u64) {}

    /// Called after each increment is written to the sink with the cumulative
    /// byte count and the declared length, if any.
    fn bytes_downloaded(&self, _written: u64, _expected: Option<u64>) {}
}

/// Discards all progress events.
pub struct NoOpProgress;

impl ProgressObserver for NoOpProgress {}

/// Emits progress as `tracing` events.
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn chunk_uploaded(&self, index: u64, total_chunks: u64) {
        let done = index + 1;
        let percent = done as f64 / total_chunks as f64 * 100.0;
        tracing::info!(
            "Upload progress: {:.1}% ({}/{})",
            percent,
            done,
            total_chunks
        );
    }

    fn bytes_downloaded(&self, written: u64, expected: Option<u64>) {
        match expected {
            Some(total) if total > 0 => tracing::debug!(
                "Download progress: {:.1}% ({}/{})",
                written as f64 / total as f64 * 100.0,
                written,
                total
            ),
            _ => tracing::debug!("Download progress: {} bytes", written),
        }
    }
}
