//! GitHub provider (REST v3) for repository files, tags and comparisons.
//!
//! Endpoints used:
//!   * GET /repos/{owner}/{repo}/contents/{path}?ref={ref}
//!   * GET /repos/{owner}/{repo}/git/refs/tags/{tag}
//!   * GET /repos/{owner}/{repo}/compare/{base}...{head}

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use remote_fetch::{DEFAULT_TIMEOUT, FetchError, RemoteFetcher, RequestOptions};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::{GitCompareError, GitCompareResult};
use crate::git_providers::GitHubConfig;
use crate::git_providers::types::*;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    fetcher: RemoteFetcher,
    base_api: String,
    authorization: String, // "token <PAT>"
    timeout: Duration,
}

impl GitHubClient {
    /// Constructs a client on top of a shared fetcher.
    pub fn new(fetcher: RemoteFetcher, cfg: GitHubConfig) -> Self {
        debug!("Creating GitHubClient with base_api={}", cfg.base_api);
        Self {
            fetcher,
            base_api: cfg.base_api,
            authorization: format!("token {}", cfg.token),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-call timeout for every request made by this client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn opts(&self) -> RequestOptions<'_> {
        RequestOptions::authorized(&self.authorization)
            .accept(GITHUB_ACCEPT)
            .timeout(self.timeout)
    }

    /// Downloads a text file through the contents API.
    ///
    /// The payload must be base64-encoded; whitespace inside it is ignored.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_file(&self, repo: &str, path: &str, branch: &str) -> GitCompareResult<String> {
        let (owner, name) = split_owner_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.base_api,
            owner,
            name,
            path.trim_start_matches('/'),
            urlencoding::encode(branch)
        );
        debug!("GitHub fetch_file: {}", url);

        let resp: GitHubContents = self.fetcher.get_json(&url, self.opts()).await?;
        decode_contents(resp)
    }

    /// `true` when `refs/tags/{tag}` exists. 404 is `false`; other failures propagate.
    #[instrument(level = "debug", skip(self))]
    pub async fn tag_exists(&self, repo: &str, tag: &str) -> GitCompareResult<bool> {
        let (owner, name) = split_owner_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/git/refs/tags/{}",
            self.base_api,
            owner,
            name,
            urlencoding::encode(tag)
        );
        debug!("GitHub tag_exists: {}", url);

        match self.fetcher.get_text(&url, self.opts()).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Compares two refs (tags, branches or SHAs).
    #[instrument(level = "debug", skip(self))]
    pub async fn compare(&self, repo: &str, base: &str, head: &str) -> GitCompareResult<TagComparison> {
        let (owner, name) = split_owner_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            self.base_api,
            owner,
            name,
            urlencoding::encode(base),
            urlencoding::encode(head)
        );
        debug!("GitHub compare: {}", url);

        let raw: GitHubCompare = self.fetcher.get_json(&url, self.opts()).await?;

        let commits = raw
            .commits
            .into_iter()
            .map(|c| {
                let GitHubCompareCommit {
                    sha,
                    html_url,
                    commit,
                } = c;
                let GitHubCommitInner { message, author } = commit;

                let (author_name, authored_at) = match author {
                    Some(a) => (a.name, a.date),
                    None => (None, None),
                };

                CompareCommit {
                    sha,
                    message,
                    author_name,
                    authored_at,
                    web_url: html_url,
                }
            })
            .collect();

        let files = raw
            .files
            .into_iter()
            .map(|f| ChangedFile {
                filename: f.filename,
                status: f.status,
                additions: f.additions,
                deletions: f.deletions,
                changes: f.changes,
                patch: f.patch,
            })
            .collect();

        Ok(TagComparison {
            repo: format!("{owner}/{name}"),
            from_tag: base.to_string(),
            to_tag: head.to_string(),
            status: raw.status,
            ahead_by: raw.ahead_by,
            behind_by: raw.behind_by,
            total_commits: raw.total_commits,
            commits,
            files,
        })
    }
}

fn decode_contents(resp: GitHubContents) -> GitCompareResult<String> {
    if resp.encoding != "base64" {
        return Err(FetchError::InvalidResponse(format!(
            "unexpected content encoding '{}'",
            resp.encoding
        ))
        .into());
    }

    let compact: String = resp.content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| FetchError::InvalidResponse(format!("invalid base64 content: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| FetchError::InvalidResponse(format!("content is not UTF-8: {e}")).into())
}

/// Splits "owner/repo" into components or returns a validation error.
pub fn split_owner_repo(project: &str) -> GitCompareResult<(String, String)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitCompareError::Validation(format!(
            "invalid GitHub repository '{}', expected 'owner/repo'",
            project
        )));
    }

    Ok((owner.to_string(), repo.to_string()))
}

/// Turns a repository URL into `owner/repo`.
///
/// Accepts `https://host/owner/repo[.git]` and `git@host:owner/repo[.git]`.
pub fn repo_path_from_url(url: &str) -> GitCompareResult<String> {
    let url = url.trim();
    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/').map(|(_, p)| p).unwrap_or_default()
    } else if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':').map(|(_, p)| p).unwrap_or_default()
    } else {
        url
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = split_owner_repo(path)?;
    Ok(format!("{owner}/{repo}"))
}

/// Accepts either `owner/repo` or a repository URL and returns `owner/repo`.
pub fn resolve_repo(input: &str) -> GitCompareResult<String> {
    if input.contains("://") || input.starts_with("git@") {
        repo_path_from_url(input)
    } else {
        let (owner, repo) = split_owner_repo(input)?;
        Ok(format!("{owner}/{repo}"))
    }
}

/// GitHub contents response (subset).
#[derive(Debug, Deserialize)]
struct GitHubContents {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// GitHub compare response (subset).
#[derive(Debug, Deserialize)]
struct GitHubCompare {
    #[serde(default = "unknown_status")]
    status: String,
    #[serde(default)]
    ahead_by: u64,
    #[serde(default)]
    behind_by: u64,
    #[serde(default)]
    total_commits: u64,
    #[serde(default)]
    commits: Vec<GitHubCompareCommit>,
    #[serde(default)]
    files: Vec<GitHubFile>,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

#[derive(Debug, Deserialize)]
struct GitHubCompareCommit {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
    commit: GitHubCommitInner,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitInner {
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: Option<GitHubCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GitHubFile {
    filename: String,
    status: FileStatus,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changes: u64,
    #[serde(default)]
    patch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_repo_must_have_two_parts() {
        assert_eq!(
            split_owner_repo("appcd-dev/appcd").unwrap(),
            ("appcd-dev".to_string(), "appcd".to_string())
        );
        for bad in ["appcd", "/appcd", "a/b/c", ""] {
            assert!(matches!(
                split_owner_repo(bad),
                Err(GitCompareError::Validation(_))
            ));
        }
    }

    #[test]
    fn repository_urls_reduce_to_owner_repo() {
        assert_eq!(
            repo_path_from_url("https://github.com/appcd-dev/appcd-ui").unwrap(),
            "appcd-dev/appcd-ui"
        );
        assert_eq!(
            repo_path_from_url("https://github.com/appcd-dev/aiden-ui-v2.git/").unwrap(),
            "appcd-dev/aiden-ui-v2"
        );
        assert_eq!(
            repo_path_from_url("git@github.com:appcd-dev/appcd.git").unwrap(),
            "appcd-dev/appcd"
        );
        assert!(repo_path_from_url("https://github.com/").is_err());
    }

    #[test]
    fn resolve_accepts_both_forms() {
        assert_eq!(resolve_repo("o/r").unwrap(), "o/r");
        assert_eq!(resolve_repo("https://github.com/o/r").unwrap(), "o/r");
        assert!(resolve_repo("nope").is_err());
    }

    #[test]
    fn contents_decoding_ignores_line_breaks() {
        let resp = GitHubContents {
            content: "QVBQQ0RfVkVS\nU0lPTj12MQo=\n".to_string(),
            encoding: "base64".to_string(),
        };
        assert_eq!(decode_contents(resp).unwrap(), "APPCD_VERSION=v1\n");
    }

    #[test]
    fn non_base64_encoding_is_an_invalid_response() {
        let resp = GitHubContents {
            content: String::new(),
            encoding: "none".to_string(),
        };
        assert!(matches!(
            decode_contents(resp),
            Err(GitCompareError::Fetch(FetchError::InvalidResponse(_)))
        ));
    }
}
