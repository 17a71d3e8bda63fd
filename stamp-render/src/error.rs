//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while compositing or saving.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The base image could not be decoded.
    #[error("Failed to decode base image: {0}")]
    Decode(String),

    /// The output raster could not be encoded.
    #[error("Failed to encode output: {0}")]
    Encode(String),

    /// The marker payload could not be rasterized.
    #[error("Failed to rasterize marker: {0}")]
    Marker(String),

    /// The marker color is not a recognizable hex color.
    #[error("Invalid marker color: {0}")]
    InvalidColor(String),

    /// A save is already in flight; concurrent saves are rejected.
    #[error("A save is already in progress")]
    SaveInFlight,

    /// The asset store lacks permission to write.
    #[error("Storage permission denied: {0}")]
    PermissionDenied(String),

    /// An I/O error occurred while persisting the asset.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
