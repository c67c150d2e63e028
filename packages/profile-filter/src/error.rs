//! Typed errors for the profile filter library.
//!
//! [`FilterError`] halts the operation and reaches the caller.
//! [`LookupError`] never leaves the country resolver; it is downgraded to an
//! unresolved country there.

use thiserror::Error;

/// Errors surfaced to callers of the filtering pipelines.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A column the operation depends on is not in the dataset schema
    #[error("missing column {column:?} (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// The tabular input could not be parsed
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: u64, reason: String },

    /// Header row names the same column twice
    #[error("duplicate column {0:?} in header")]
    DuplicateColumn(String),

    /// Reading input or writing an artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of a single geocoding lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The lookup did not finish within its time budget
    #[error("lookup timed out")]
    Timeout,

    /// Network or service failure
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with something unusable
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<nominatim_client::NominatimError> for LookupError {
    fn from(err: nominatim_client::NominatimError) -> Self {
        use nominatim_client::NominatimError;

        match err {
            NominatimError::Timeout { .. } => Self::Timeout,
            NominatimError::Decode(e) => Self::Malformed(e.to_string()),
            other => Self::Transport(Box::new(other)),
        }
    }
}

/// Result type alias for filtering operations.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Result type alias for geocoding lookups.
pub type LookupResult<T> = std::result::Result<T, LookupError>;
