use crate::error::ClientError;

/// Byte range `[start, end)` of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: u64,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Partition of a file into fixed-size chunks.
///
/// An empty file is planned as a single zero-length chunk: the service only
/// issues a token in reply to the chunk whose `index + 1 == total_chunks`, so
/// a plan with no chunks could never complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
    total_chunks: u64,
}

impl ChunkPlan {
    pub fn new(file_size: u64, chunk_size: u64) -> Result<Self, ClientError> {
        if chunk_size == 0 {
            return Err(ClientError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        let total_chunks = file_size.div_ceil(chunk_size).max(1);
        Ok(Self {
            file_size,
            chunk_size,
            total_chunks,
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn total_chunks(&self) -> u64 {
        self.total_chunks
    }

    pub fn is_last(&self, index: u64) -> bool {
        index + 1 == self.total_chunks
    }

    pub fn range(&self, index: u64) -> Option<ChunkRange> {
        if index >= self.total_chunks {
            return None;
        }
        let start = index * self.chunk_size;
        let end = start.saturating_add(self.chunk_size).min(self.file_size);
        Some(ChunkRange { index, start, end })
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (0..self.total_chunks).filter_map(move |i| self.range(i))
    }
}
