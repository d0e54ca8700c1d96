//! Per-call read configuration.

use crate::error::{Result, TypedSocketError};

/// Default capacity hint for the read buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default size of each chunk pulled off the connection.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Buffer and chunk sizing used by `read_with` and `read_from_with`.
///
/// The chunked read uses `buffer_size` as the initial capacity of its
/// growable buffer and `chunk_size` as the size of each socket read. The bulk
/// read allocates exactly `buffer_size` bytes and ignores `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Capacity hint for the accumulation buffer.
    pub buffer_size: usize,
    /// Read granularity.
    pub chunk_size: usize,
}

impl ReadOptions {
    /// Create options with explicit sizes.
    pub const fn new(buffer_size: usize, chunk_size: usize) -> Self {
        Self {
            buffer_size,
            chunk_size,
        }
    }

    /// Set the buffer size.
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the chunk size.
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Reject sizes a read cannot make progress with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(TypedSocketError::InvalidArgument("buffer size must be positive"));
        }
        if self.chunk_size == 0 {
            return Err(TypedSocketError::InvalidArgument("chunk size must be positive"));
        }
        Ok(())
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE)
    }
}
