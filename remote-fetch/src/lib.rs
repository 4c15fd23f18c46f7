//! Remote content fetcher.
//!
//! Every network call in the workspace goes through [`RemoteFetcher`]: the
//! deployed `version.json` endpoint, the GitHub contents/compare APIs and the
//! Linear GraphQL endpoint. Each call:
//!   * takes a URL, an optional `Authorization` header value and a timeout
//!   * returns the full body (text or decoded JSON)
//!   * or a [`FetchError`] that distinguishes not-found, unauthorized, other
//!     HTTP statuses and network/timeout failures
//!
//! Calls are awaited one at a time by the callers; nothing here retries.

pub mod env;
mod errors;

pub use errors::{FetchError, FetchResult};

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("release-diff/", env!("CARGO_PKG_VERSION"));

/// Per-request knobs. `Default` means no auth, no explicit `Accept`, and
/// [`DEFAULT_TIMEOUT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions<'a> {
    /// Full `Authorization` header value, e.g. `"token <PAT>"`.
    pub authorization: Option<&'a str>,
    /// `Accept` header value.
    pub accept: Option<&'a str>,
    /// Overrides [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
}

impl<'a> RequestOptions<'a> {
    pub fn authorized(authorization: &'a str) -> Self {
        Self {
            authorization: Some(authorization),
            ..Self::default()
        }
    }

    pub fn accept(mut self, accept: &'a str) -> Self {
        self.accept = Some(accept);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Shared HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    http: Client,
}

impl RemoteFetcher {
    /// Builds a fetcher with a stable user agent.
    pub fn new() -> FetchResult<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    /// Wraps an already configured client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// `GET url` and return the body as text.
    pub async fn get_text(&self, url: &str, opts: RequestOptions<'_>) -> FetchResult<String> {
        let url = parse_url(url)?;
        debug!(%url, "GET");
        let req = self.http.get(url);
        self.send(req, opts).await
    }

    /// `GET url` and decode the body as JSON.
    pub async fn get_json<T>(&self, url: &str, opts: RequestOptions<'_>) -> FetchResult<T>
    where
        T: DeserializeOwned,
    {
        let body = self.get_text(url, opts).await?;
        decode_json(&body)
    }

    /// `POST url` with a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(
        &self,
        url: &str,
        body: &B,
        opts: RequestOptions<'_>,
    ) -> FetchResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = parse_url(url)?;
        debug!(%url, "POST");
        let req = self.http.post(url).json(body);
        let text = self.send(req, opts).await?;
        decode_json(&text)
    }

    async fn send(&self, req: RequestBuilder, opts: RequestOptions<'_>) -> FetchResult<String> {
        let mut req = req.timeout(opts.timeout.unwrap_or(DEFAULT_TIMEOUT));
        if let Some(auth) = opts.authorization {
            req = req.header(AUTHORIZATION, auth);
        }
        if let Some(accept) = opts.accept {
            req = req.header(ACCEPT, accept);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let err = FetchError::from_status(status.as_u16(), retry_after_secs);
            debug!(status = status.as_u16(), url = %resp.url(), "remote call failed");
            return Err(err);
        }

        let text = resp.text().await?;
        debug!(bytes = text.len(), "response received");
        Ok(text)
    }
}

fn parse_url(url: &str) -> FetchResult<Url> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))
}

fn decode_json<T: DeserializeOwned>(body: &str) -> FetchResult<T> {
    serde_json::from_str(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
}
