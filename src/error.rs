use std::collections::TryReserveError;

/// Errors reported by term vector operations
#[derive(Debug, thiserror::Error)]
pub enum TermVectorError {
    /// Backing storage could not be obtained
    #[error("out of memory: could not reserve {requested} slots")]
    OutOfMemory {
        /// Number of slots that were requested
        requested: u64,
    },

    /// A required argument was missing or out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A persisted stream ended early or held data that cannot be a vector
    #[error("corrupt or truncated stream: {0}")]
    Corrupt(String),

    /// Any other failure of the underlying stream
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The portable serde form could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TermVectorError {
    /// Map a failed reservation of `requested` slots
    pub(crate) fn out_of_memory(requested: u64, _source: TryReserveError) -> Self {
        TermVectorError::OutOfMemory { requested }
    }
}

pub type Result<T> = std::result::Result<T, TermVectorError>;
