//! Linear GraphQL client.
//!
//! Lookups are sequential: [`LinearClient::fetch_all`] walks the sorted
//! identifier set one request at a time and records a per-ticket result, so
//! one failing ticket never aborts the rest.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use remote_fetch::env::{env_opt, is_http_endpoint};
use remote_fetch::{RemoteFetcher, RequestOptions};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::errors::{TrackerConfigError, TrackerError, TrackerResult};
use crate::progress::Progress;

pub const DEFAULT_LINEAR_API: &str = "https://api.linear.app/graphql";

/// Per-request timeout for tracker calls.
pub const LINEAR_TIMEOUT: Duration = Duration::from_secs(10);

const ISSUE_QUERY: &str = r#"
query IssueByIdentifier($identifier: String!) {
    issue(id: $identifier) {
        id
        identifier
        title
        state { name }
        priority
        assignee { name }
        project { name }
    }
}
"#;

const VIEWER_QUERY: &str = r#"
query {
    viewer { id name email }
}
"#;

/// Endpoint and credential for the tracker.
#[derive(Clone)]
pub struct LinearConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for LinearConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl LinearConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, TrackerConfigError> {
        let endpoint = endpoint.into();
        if !is_http_endpoint(&endpoint) {
            return Err(TrackerConfigError::InvalidEndpoint(endpoint));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TrackerConfigError::MissingApiKey);
        }
        Ok(Self { endpoint, api_key })
    }

    /// Key from `api_key` (CLI) or `LINEAR_API_KEY`; endpoint from
    /// `LINEAR_API_URL` or [`DEFAULT_LINEAR_API`].
    pub fn from_env(api_key: Option<String>) -> Result<Self, TrackerConfigError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_opt("LINEAR_API_KEY"))
            .ok_or(TrackerConfigError::MissingApiKey)?;
        let endpoint = env_opt("LINEAR_API_URL").unwrap_or_else(|| DEFAULT_LINEAR_API.to_string());
        Self::new(endpoint, api_key)
    }

    /// First characters of the key, for display.
    pub fn key_preview(&self) -> String {
        let head: String = self.api_key.chars().take(10).collect();
        format!("{head}...")
    }
}

/// Issue fields used in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub identifier: String,
    pub title: String,
    /// Workflow state name, `"Unknown"` when absent.
    pub state: String,
    /// 0 = none, 1 = urgent .. 4 = low.
    pub priority: Option<u8>,
    /// Assignee name, `"Unassigned"` when absent.
    pub assignee: String,
    pub project: Option<String>,
}

/// Human label for a Linear priority value.
pub fn priority_label(priority: Option<u8>) -> &'static str {
    match priority {
        Some(1) => "Urgent",
        Some(2) => "High",
        Some(3) => "Medium",
        Some(4) => "Low",
        Some(0) => "No priority",
        _ => "Unknown",
    }
}

/// The account behind an API key.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Outcome of enriching a set of identifiers. `None` at the call site means
/// enrichment was not attempted.
#[derive(Debug, Default)]
pub struct TicketDetails {
    entries: BTreeMap<String, TrackerResult<TicketDetail>>,
}

impl TicketDetails {
    pub fn insert(&mut self, ticket: String, result: TrackerResult<TicketDetail>) {
        self.entries.insert(ticket, result);
    }

    /// Details for a ticket whose lookup succeeded.
    pub fn get(&self, ticket: &str) -> Option<&TicketDetail> {
        self.entries.get(ticket).and_then(|r| r.as_ref().ok())
    }

    pub fn error(&self, ticket: &str) -> Option<&TrackerError> {
        self.entries.get(ticket).and_then(|r| r.as_ref().err())
    }

    /// `"ID: title"` when details are known, else `"ID"`.
    pub fn label(&self, ticket: &str) -> String {
        match self.get(ticket) {
            Some(d) if !d.title.is_empty() => format!("{ticket}: {}", d.title),
            _ => ticket.to_string(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.entries.values().filter(|r| r.is_ok()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TrackerResult<TicketDetail>)> for TicketDetails {
    fn from_iter<I: IntoIterator<Item = (String, TrackerResult<TicketDetail>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Linear HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct LinearClient {
    fetcher: RemoteFetcher,
    cfg: LinearConfig,
}

impl LinearClient {
    pub fn new(fetcher: RemoteFetcher, cfg: LinearConfig) -> Self {
        debug!("Creating LinearClient with endpoint={}", cfg.endpoint);
        Self { fetcher, cfg }
    }

    pub fn config(&self) -> &LinearConfig {
        &self.cfg
    }

    async fn query<T>(&self, query: &str, variables: Option<serde_json::Value>) -> TrackerResult<T>
    where
        T: DeserializeOwned,
    {
        let body = match variables {
            Some(v) => json!({ "query": query, "variables": v }),
            None => json!({ "query": query }),
        };
        // Linear expects the raw key, no scheme prefix.
        let opts = RequestOptions::authorized(&self.cfg.api_key).timeout(LINEAR_TIMEOUT);

        let resp: GraphQlResponse<T> = self
            .fetcher
            .post_json(&self.cfg.endpoint, &body, opts)
            .await?;

        if !resp.errors.is_empty() {
            let messages: Vec<&str> = resp.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(TrackerError::Api(messages.join("; ")));
        }

        resp.data
            .ok_or_else(|| TrackerError::UnexpectedResponse("missing data".to_string()))
    }

    /// Looks up one issue by identifier (e.g. `AB-123`).
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_ticket(&self, identifier: &str) -> TrackerResult<TicketDetail> {
        let data: IssueData = self
            .query(ISSUE_QUERY, Some(json!({ "identifier": identifier })))
            .await?;

        let issue = data
            .issue
            .ok_or_else(|| TrackerError::TicketNotFound(identifier.to_string()))?;
        Ok(issue.into_detail())
    }

    /// Looks up every identifier in order, one request at a time.
    #[instrument(level = "debug", skip_all, fields(total = tickets.len()))]
    pub async fn fetch_all(
        &self,
        tickets: &BTreeSet<String>,
        progress: &dyn Progress,
    ) -> TicketDetails {
        progress.set_total(tickets.len() as u64);

        let mut details = TicketDetails::default();
        for ticket in tickets {
            progress.message(&format!("Fetching {ticket}..."));
            let result = self.fetch_ticket(ticket).await;
            if let Err(e) = &result {
                warn!(ticket = %ticket, error = %e, "ticket details unavailable");
            }
            details.insert(ticket.clone(), result);
            progress.step(ticket);
        }

        let summary = format!(
            "Successfully fetched {}/{} ticket details",
            details.succeeded(),
            details.len()
        );
        info!("{summary}");
        progress.finish(&summary);
        details
    }

    /// Verifies the key by asking who it belongs to.
    #[instrument(level = "debug", skip(self))]
    pub async fn check_connection(&self) -> TrackerResult<Viewer> {
        let data: ViewerData = self.query(VIEWER_QUERY, None).await?;
        data.viewer
            .ok_or_else(|| TrackerError::UnexpectedResponse("no viewer in response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: Option<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Option<Viewer>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    identifier: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: Option<Named>,
    #[serde(default)]
    priority: Option<f64>,
    #[serde(default)]
    assignee: Option<Named>,
    #[serde(default)]
    project: Option<Named>,
}

impl RawIssue {
    fn into_detail(self) -> TicketDetail {
        let priority = self
            .priority
            .filter(|p| p.is_finite() && (0.0..=f64::from(u8::MAX)).contains(p))
            .map(|p| p as u8);

        TicketDetail {
            identifier: self.identifier,
            title: self.title,
            state: self.state.map(|s| s.name).unwrap_or_else(|| "Unknown".to_string()),
            priority,
            assignee: self
                .assignee
                .map(|a| a.name)
                .unwrap_or_else(|| "Unassigned".to_string()),
            project: self.project.map(|p| p.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_issue_fields_get_defaults() {
        let raw: RawIssue = serde_json::from_value(json!({
            "identifier": "AB-1",
            "title": "Fix it",
            "state": null,
            "priority": 2,
            "assignee": null
        }))
        .unwrap();

        let detail = raw.into_detail();
        assert_eq!(detail.state, "Unknown");
        assert_eq!(detail.assignee, "Unassigned");
        assert_eq!(detail.priority, Some(2));
        assert_eq!(priority_label(detail.priority), "High");
        assert_eq!(detail.project, None);
    }

    #[test]
    fn config_requires_key_and_http_endpoint() {
        assert!(matches!(
            LinearConfig::new(DEFAULT_LINEAR_API, "  "),
            Err(TrackerConfigError::MissingApiKey)
        ));
        assert!(matches!(
            LinearConfig::new("api.linear.app", "lin_api_x"),
            Err(TrackerConfigError::InvalidEndpoint(_))
        ));

        let cfg = LinearConfig::new(DEFAULT_LINEAR_API, "lin_api_0123456789abcdef").unwrap();
        assert_eq!(cfg.key_preview(), "lin_api_01...");
        assert!(!format!("{cfg:?}").contains("abcdef"));
    }

    #[test]
    fn labels_fall_back_to_the_identifier() {
        let details: TicketDetails = [
            (
                "AB-1".to_string(),
                Ok(TicketDetail {
                    identifier: "AB-1".into(),
                    title: "Fix it".into(),
                    state: "Done".into(),
                    priority: None,
                    assignee: "Dana".into(),
                    project: None,
                }),
            ),
            (
                "AB-2".to_string(),
                Err(TrackerError::TicketNotFound("AB-2".into())),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(details.label("AB-1"), "AB-1: Fix it");
        assert_eq!(details.label("AB-2"), "AB-2");
        assert_eq!(details.label("AB-3"), "AB-3");
        assert_eq!(details.succeeded(), 1);
        assert!(details.error("AB-2").is_some());
    }
}
