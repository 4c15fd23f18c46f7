//! Crate-wide error hierarchy for git-compare-engine.

use remote_fetch::FetchError;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitCompareResult<T> = Result<T, GitCompareError>;

/// Root error type for the git-compare-engine crate.
#[derive(Debug, Error)]
pub enum GitCompareError {
    /// HTTP-level failure talking to the provider.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration problems (missing token, bad base URL).
    #[error(transparent)]
    Config(#[from] GitCompareConfigError),

    /// Input validation errors (bad `owner/repo`, unusable repository URL).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum GitCompareConfigError {
    /// None of the accepted token variables is set.
    #[error(
        "GitHub token not found. Set GITHUB_PAT, GH_TOKEN or GITHUB_ACCESS_TOKEN environment variable"
    )]
    MissingToken,

    /// Invalid base API URL.
    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),
}

impl GitCompareError {
    /// `true` when the provider answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitCompareError::Fetch(e) if e.is_not_found())
    }
}
