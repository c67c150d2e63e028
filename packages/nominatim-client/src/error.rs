use thiserror::Error;

/// Errors returned by the Nominatim client.
#[derive(Debug, Error)]
pub enum NominatimError {
    /// Transport-level failure (DNS, connection reset, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("request timed out: {query}")]
    Timeout { query: String },

    /// Nominatim answered with a non-success status
    #[error("Nominatim API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl NominatimError {
    pub(crate) fn from_reqwest(err: reqwest::Error, query: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                query: query.to_string(),
            }
        } else {
            Self::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, NominatimError>;
