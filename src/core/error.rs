//! Error types for upstream quote fetches

use thiserror::Error;

/// Failure of a single upstream request.
///
/// Carries messages rather than the underlying `reqwest::Error` so the
/// error can be cloned and handed to every caller waiting on the same
/// in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
}

impl FetchError {
    pub fn transport(url: &str, err: reqwest::Error) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn malformed(url: &str, message: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome classification for the resources that make up a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteFetchError {
    /// The dollar list could not be fetched; no snapshot can be built.
    #[error("required {resource} quotes unavailable")]
    RequiredFetchFailure {
        resource: &'static str,
        #[source]
        source: FetchError,
    },

    /// An optional quote failed; the snapshot degrades that field to absent.
    #[error("optional {resource} quote unavailable")]
    OptionalFetchFailure {
        resource: &'static str,
        #[source]
        source: FetchError,
    },
}

impl QuoteFetchError {
    pub fn required(resource: &'static str, source: FetchError) -> Self {
        QuoteFetchError::RequiredFetchFailure { resource, source }
    }

    pub fn optional(resource: &'static str, source: FetchError) -> Self {
        QuoteFetchError::OptionalFetchFailure { resource, source }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, QuoteFetchError::RequiredFetchFailure { .. })
    }
}
