//! Error hierarchy for ticket-tracker.

use remote_fetch::FetchError;
use thiserror::Error;

/// Convenient alias for tracker lookups.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Why one tracker call failed.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// HTTP-level failure (status, timeout, transport).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The GraphQL endpoint answered with an `errors` array.
    #[error("Linear API error: {0}")]
    Api(String),

    /// The query succeeded but returned no issue for this identifier.
    #[error("ticket {0} not found")]
    TicketNotFound(String),

    /// The response carried neither data nor errors.
    #[error("unexpected Linear response: {0}")]
    UnexpectedResponse(String),
}

/// Setup problems detected before any ticket is looked up.
#[derive(Debug, Error)]
pub enum TrackerConfigError {
    /// Enrichment was requested but no key is available.
    #[error("Linear API key not found. Set LINEAR_API_KEY or pass --api-key")]
    MissingApiKey,

    /// A caller-supplied ticket pattern does not compile.
    #[error("invalid ticket pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// `LINEAR_API_URL` is not an http(s) URL.
    #[error("invalid Linear endpoint: {0}")]
    InvalidEndpoint(String),
}
