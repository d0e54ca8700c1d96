//! Error types for typed-sockets.

use thiserror::Error;

use crate::transport::ConnectionKind;

/// Boxed cause carried by conversion errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all typed connection operations.
#[derive(Debug, Error)]
pub enum TypedSocketError {
    /// A caller-supplied argument cannot be used (e.g. a zero chunk size).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The wrapped handle cannot perform the requested operation.
    #[error("{kind} connection is an invalid connection type for this operation")]
    UnsupportedOperation { kind: ConnectionKind },

    /// The payload could not be turned into bytes. Nothing was written.
    #[error("could not marshal data to write")]
    Marshal {
        #[source]
        source: BoxError,
    },

    /// The bytes accumulated by a chunked read did not decode.
    #[error("unmarshal of data returned an error")]
    Unmarshal {
        #[source]
        source: BoxError,
    },

    /// The bytes received by a bulk read did not decode into `type_name`.
    #[error("could not unmarshal incoming buffer into {type_name}")]
    Decode {
        type_name: &'static str,
        read: u64,
        #[source]
        source: BoxError,
    },

    /// The bulk read itself failed.
    #[error("could not receive incoming buffer")]
    Receive {
        read: u64,
        #[source]
        source: std::io::Error,
    },

    /// The peer closed its side while a chunked read was accumulating.
    ///
    /// `consumed` bytes were taken off the socket and are not decoded.
    #[error("end of stream after {consumed} bytes")]
    EndOfStream { consumed: usize },

    /// Transport error reported by the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TypedSocketError {
    /// Byte count reported alongside the error, if the operation consumed any.
    pub fn bytes_read(&self) -> u64 {
        match self {
            Self::EndOfStream { consumed } => *consumed as u64,
            Self::Receive { read, .. } | Self::Decode { read, .. } => *read,
            _ => 0,
        }
    }

    /// Whether this is the end-of-stream signal from a chunked read.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream { .. })
    }
}

/// Result type alias using TypedSocketError.
pub type Result<T> = std::result::Result<T, TypedSocketError>;
