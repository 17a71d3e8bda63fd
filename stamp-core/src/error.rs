//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type StampResult<T> = Result<T, StampError>;

/// Errors that can occur while driving an editing session.
#[derive(Debug, Error)]
pub enum StampError {
    /// Camera capture failed.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Gallery pick failed (a cancelled pick is not an error).
    #[error("Gallery pick failed: {0}")]
    Gallery(String),

    /// A required permission was not granted.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The supplied base image could not be used.
    #[error("Invalid base image: {0}")]
    InvalidImage(String),
}
