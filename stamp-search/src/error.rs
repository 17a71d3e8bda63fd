//! Error types for place search.

use thiserror::Error;

/// Result type for place-search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while looking up places.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP layer failed (connection, timeout, body decode).
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A provider endpoint URL was malformed.
    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// A provider answered with a non-success status.
    #[error("Provider {provider} returned status {status}")]
    Status {
        /// Name of the failing provider.
        provider: &'static str,
        /// HTTP status code received.
        status: u16,
    },

    /// The fallback chain has no providers configured.
    #[error("No search providers configured")]
    NoProviders,
}
