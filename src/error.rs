//! Error types for the erasure-coded device engine

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the erasure-coded device engine
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from a backend adapter
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid codec or device configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    // =========================================================================
    // Galois Field / Matrix Kernel Errors
    // =========================================================================
    /// Division by zero in the Galois field
    #[error("division by zero in the Galois field")]
    ZeroDivision,

    /// Vector or matrix shapes do not agree
    #[error("vector or matrix dimension mismatch")]
    DimensionMismatch,

    /// Gauss-Jordan elimination could not produce an inverse
    #[error("matrix is not invertible")]
    NoninvertibleMatrix,

    /// The field cannot address the requested number of code rows
    #[error("Galois field too small: {total} slices exceed field size {field_size}")]
    InsufficientFieldSize { total: usize, field_size: usize },

    // =========================================================================
    // Codec Errors
    // =========================================================================
    /// Buffer length is not a multiple of the data slice count
    #[error("buffer of {len} bytes misaligned to stripe width {stripe}")]
    Misaligned { len: usize, stripe: usize },

    /// Fewer usable slices than the code needs to recover data
    #[error("too few slices for data recovery: have {available}, need {required}")]
    TooFewSlices { available: usize, required: usize },

    /// Input slices disagree on their length
    #[error("slice {index} has {actual} bytes, expected {expected}")]
    SliceMismatch {
        index: usize,
        actual: usize,
        expected: usize,
    },

    // =========================================================================
    // Device Errors
    // =========================================================================
    /// Reserved for a future block-granular API
    #[error("request not aligned to the block size")]
    BlockMisalignment,

    /// Reserved for replica rebuild scheduling
    #[error("rebuild in progress")]
    RebuildInProgress,

    /// Operation surface is reserved but not implemented
    #[error("not yet implemented")]
    NotImplemented,
}
