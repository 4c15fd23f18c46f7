//! Source-control provider access.
//!
//! Only GitHub is supported. [`GitHubConfig`] is read from the environment and
//! [`github::GitHubClient`] performs the calls through the shared
//! [`remote_fetch::RemoteFetcher`].

pub mod github;
pub mod types;

pub use github::{GitHubClient, repo_path_from_url, resolve_repo, split_owner_repo};
pub use types::*;

use remote_fetch::env::{env_opt, first_env, is_http_endpoint};
use tracing::debug;

use crate::errors::{GitCompareConfigError, GitCompareResult};

/// Default REST v3 base.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Token variables, in lookup order.
pub const TOKEN_VARS: [&str; 3] = ["GITHUB_PAT", "GH_TOKEN", "GITHUB_ACCESS_TOKEN"];

/// Runtime configuration for the GitHub client.
#[derive(Clone)]
pub struct GitHubConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Personal access token (without the `token ` prefix).
    pub token: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("base_api", &self.base_api)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitHubConfig {
    pub fn new(base_api: impl Into<String>, token: impl Into<String>) -> GitCompareResult<Self> {
        let base_api = base_api.into().trim_end_matches('/').to_string();
        if !is_http_endpoint(&base_api) {
            return Err(GitCompareConfigError::InvalidBaseUrl(base_api).into());
        }
        Ok(Self {
            base_api,
            token: token.into(),
        })
    }

    /// Token from `GITHUB_PAT`, `GH_TOKEN` or `GITHUB_ACCESS_TOKEN`; base
    /// URL from `GITHUB_API_URL` (defaults to [`DEFAULT_GITHUB_API`]).
    pub fn from_env() -> GitCompareResult<Self> {
        let token = first_env(&TOKEN_VARS).ok_or(GitCompareConfigError::MissingToken)?;
        let base_api = env_opt("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API.to_string());
        debug!(base_api = %base_api, "GitHub config loaded");
        Self::new(base_api, token)
    }
}
