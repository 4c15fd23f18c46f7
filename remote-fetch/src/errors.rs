//! Failure taxonomy for remote fetches.

use thiserror::Error;

/// Convenient alias for fetch results.
pub type FetchResult<T> = Result<T, FetchError>;

/// Why a remote call did not produce a usable body.
///
/// Callers decide whether a given variant is fatal for their run or just
/// means "no data on this side" (see [`FetchError::is_not_found`]).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited {
        /// Optional `Retry-After` hint in seconds when available.
        retry_after_secs: Option<u64>,
    },

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Body arrived but could not be decoded into the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Maps a non-success HTTP status into a variant.
    pub fn from_status(code: u16, retry_after_secs: Option<u64>) -> Self {
        match code {
            401 => FetchError::Unauthorized,
            403 => FetchError::Forbidden,
            404 => FetchError::NotFound,
            429 => FetchError::RateLimited { retry_after_secs },
            500..=599 => FetchError::Server(code),
            _ => FetchError::HttpStatus(code),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized | FetchError::Forbidden)
    }

    /// HTTP status code carried by the failure, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Unauthorized => Some(401),
            FetchError::Forbidden => Some(403),
            FetchError::NotFound => Some(404),
            FetchError::RateLimited { .. } => Some(429),
            FetchError::Server(code) | FetchError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

// ===== Mapping from reqwest::Error into FetchError =====

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout;
        }

        if let Some(status) = e.status() {
            return FetchError::from_status(status.as_u16(), None);
        }

        if e.is_decode() {
            return FetchError::InvalidResponse(e.to_string());
        }

        FetchError::Network(e.to_string())
    }
}
