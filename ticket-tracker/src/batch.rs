//! Batch ticket extraction data model.
//!
//! Two batch shapes share this module:
//! - the manifest batch (`process-all`), one [`ServiceTicketResult`] per
//!   release entry, folded into a [`BatchReport`];
//! - the line-oriented batch (`repo-batch`), one [`RepoRequest`] per input
//!   line, summarised by [`format_repo_batch_summary`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use version_compare::ServiceRelease;

use crate::extractor::group_by_project;
use crate::linear::TicketDetails;

/// Per-service outcome in the manifest batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Success,
    NewService,
    NoNewVersion,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTicketResult {
    pub service: String,
    pub repository: String,
    pub repo_path: String,
    pub version_key: String,
    pub current_tag: String,
    pub new_tag: String,
    pub status: ServiceStatus,
    pub tickets: Vec<String>,
    pub ticket_count: usize,
    pub error: Option<String>,
}

impl ServiceTicketResult {
    fn base(release: &ServiceRelease, repo_path: String, status: ServiceStatus) -> Self {
        Self {
            service: release.service.clone(),
            repository: release.repository.clone(),
            repo_path,
            version_key: release.version_key.clone(),
            current_tag: release.current_tag.clone(),
            new_tag: release.new_tag.clone(),
            status,
            tickets: Vec::new(),
            ticket_count: 0,
            error: None,
        }
    }

    pub fn success(release: &ServiceRelease, repo_path: String, tickets: BTreeSet<String>) -> Self {
        let mut result = Self::base(release, repo_path, ServiceStatus::Success);
        result.ticket_count = tickets.len();
        result.tickets = tickets.into_iter().collect();
        result
    }

    pub fn new_service(release: &ServiceRelease, repo_path: String) -> Self {
        Self::base(release, repo_path, ServiceStatus::NewService)
    }

    pub fn no_new_version(release: &ServiceRelease, repo_path: String) -> Self {
        Self::base(release, repo_path, ServiceStatus::NoNewVersion)
    }

    pub fn failed(release: &ServiceRelease, repo_path: String, error: impl Into<String>) -> Self {
        let mut result = Self::base(release, repo_path, ServiceStatus::Error);
        result.error = Some(error.into());
        result
    }
}

/// Whether a manifest entry is worth looking at. Entries without any tag are
/// always skipped; unchanged entries only when `include_unchanged` is off.
pub fn should_process(release: &ServiceRelease, include_unchanged: bool) -> bool {
    if release.current_tag.is_empty() && release.new_tag.is_empty() {
        return false;
    }
    include_unchanged || release.current_tag != release.new_tag
}

/// What to do with an entry that passed [`should_process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePlan {
    /// No previous tag: nothing to compare against.
    NewService,
    /// No target tag.
    NoNewVersion,
    Compare,
}

pub fn plan(release: &ServiceRelease) -> ServicePlan {
    if release.current_tag.is_empty() && !release.new_tag.is_empty() {
        ServicePlan::NewService
    } else if release.new_tag.is_empty() {
        ServicePlan::NoNewVersion
    } else {
        ServicePlan::Compare
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub generated_at: NaiveDateTime,
    pub total_services: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_unique_tickets: usize,
}

/// Consolidated manifest batch output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub metadata: BatchMetadata,
    pub services: Vec<ServiceTicketResult>,
    /// `"ID: title"` when details are known, else `"ID"`.
    pub all_tickets: Vec<String>,
    pub tickets_by_project: BTreeMap<String, Vec<String>>,
}

/// Accumulates results while the batch runs.
#[derive(Debug, Default)]
pub struct BatchTally {
    total_services: usize,
    skipped: usize,
    results: Vec<ServiceTicketResult>,
}

impl BatchTally {
    pub fn new(total_services: usize) -> Self {
        Self {
            total_services,
            ..Self::default()
        }
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record(&mut self, result: ServiceTicketResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[ServiceTicketResult] {
        &self.results
    }

    /// Distinct tickets across successful services.
    pub fn unique_tickets(&self) -> BTreeSet<String> {
        self.results
            .iter()
            .filter(|r| r.status == ServiceStatus::Success)
            .flat_map(|r| r.tickets.iter().cloned())
            .collect()
    }

    pub fn into_report(
        self,
        details: Option<&TicketDetails>,
        generated_at: NaiveDateTime,
    ) -> BatchReport {
        let unique = self.unique_tickets();
        let count = |status: ServiceStatus| self.results.iter().filter(|r| r.status == status).count();

        let metadata = BatchMetadata {
            generated_at,
            total_services: self.total_services,
            processed: count(ServiceStatus::Success),
            skipped: self.skipped,
            failed: count(ServiceStatus::Error),
            total_unique_tickets: unique.len(),
        };

        let all_tickets = unique
            .iter()
            .map(|id| details.map_or_else(|| id.clone(), |d| d.label(id)))
            .collect();

        BatchReport {
            metadata,
            tickets_by_project: group_by_project(&unique),
            all_tickets,
            services: self.results,
        }
    }
}

/// Console summary for a finished manifest batch.
pub fn format_batch_summary(report: &BatchReport) -> String {
    let m = &report.metadata;
    let mut out = String::new();
    let _ = writeln!(out, "Total services: {}", m.total_services);
    let _ = writeln!(out, "Processed: {}", m.processed);
    let _ = writeln!(out, "Skipped (no changes): {}", m.skipped);
    let _ = writeln!(out, "Failed: {}", m.failed);
    let _ = writeln!(out, "Unique tickets across all services: {}", m.total_unique_tickets);

    if !report.tickets_by_project.is_empty() {
        out.push_str("\nTickets by project:\n");
        for (prefix, ids) in &report.tickets_by_project {
            let _ = writeln!(out, "  - {prefix}: {} tickets", ids.len());
        }
    }
    out
}

// ===== Line-oriented batch =====

/// One `owner/repo:from:to` or `owner/repo from to` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRequest {
    pub repo: String,
    pub from_tag: String,
    pub to_tag: String,
}

impl RepoRequest {
    /// Parses one input line. Colon form is tried first, then whitespace.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let from_parts = |parts: &[&str]| match parts {
            [repo, from, to] if ![repo, from, to].iter().any(|p| p.trim().is_empty()) => {
                Some(Self {
                    repo: repo.trim().to_string(),
                    from_tag: from.trim().to_string(),
                    to_tag: to.trim().to_string(),
                })
            }
            _ => None,
        };

        if line.contains(':') {
            let parts: Vec<&str> = line.split(':').collect();
            if let Some(req) = from_parts(&parts) {
                return Some(req);
            }
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        from_parts(&parts)
    }

    /// `tickets_{repo}_{from}_to_{to}.txt`, with `/` and `:` flattened.
    pub fn default_output_file(&self) -> String {
        let safe_repo = self.repo.replace(['/', ':'], "_");
        format!("tickets_{safe_repo}_{}_to_{}.txt", self.from_tag, self.to_tag)
    }
}

/// Blank lines and `#` comments carry no request.
pub fn is_ignorable_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Result of one line-oriented request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRequestOutcome {
    pub request: RepoRequest,
    pub ticket_count: usize,
    pub output_file: String,
    pub timestamp: NaiveDateTime,
    pub error: Option<String>,
}

impl RepoRequestOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// `ticket_processing_summary_{YYYYmmdd_HHMMSS}.txt`
pub fn default_summary_file(now: NaiveDateTime) -> String {
    format!("ticket_processing_summary_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Text summary file for a line-oriented batch.
pub fn format_repo_batch_summary(outcomes: &[RepoRequestOutcome], generated_at: NaiveDateTime) -> String {
    let (ok, failed): (Vec<&RepoRequestOutcome>, Vec<&RepoRequestOutcome>) =
        outcomes.iter().partition(|o| o.is_success());
    let total_tickets: usize = ok.iter().map(|o| o.ticket_count).sum();
    let rule = "-".repeat(30);

    let mut out = String::new();
    out.push_str("SINGLE REPOSITORY TICKET PROCESSING SUMMARY\n");
    let _ = writeln!(out, "{}\n", "=".repeat(60));
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Total requests processed: {}", outcomes.len());
    let _ = writeln!(out, "Successful requests: {}", ok.len());
    let _ = writeln!(out, "Failed requests: {}", failed.len());
    let _ = writeln!(out, "Total tickets found: {total_tickets}\n");

    if !ok.is_empty() {
        out.push_str("SUCCESSFUL REQUESTS\n");
        let _ = writeln!(out, "{rule}");
        for o in &ok {
            let r = &o.request;
            let _ = writeln!(
                out,
                "{} ({} -> {}): {} tickets",
                r.repo, r.from_tag, r.to_tag, o.ticket_count
            );
            let _ = writeln!(out, "  Output file: {}", o.output_file);
            let _ = writeln!(out, "  Processed: {}\n", o.timestamp.format("%Y-%m-%dT%H:%M:%S"));
        }
    }

    if !failed.is_empty() {
        out.push_str("FAILED REQUESTS\n");
        let _ = writeln!(out, "{rule}");
        for o in &failed {
            let r = &o.request;
            let _ = writeln!(out, "{} ({} -> {})", r.repo, r.from_tag, r.to_tag);
            let _ = writeln!(
                out,
                "  Error: {}",
                o.error.as_deref().unwrap_or("Unknown error")
            );
            let _ = writeln!(out, "  Attempted: {}\n", o.timestamp.format("%Y-%m-%dT%H:%M:%S"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrackerError;
    use crate::linear::TicketDetail;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn release(service: &str, current: &str, new: &str) -> ServiceRelease {
        ServiceRelease {
            service: service.into(),
            repository: format!("https://github.com/o/{service}"),
            version_key: format!("{}_VERSION", service.to_uppercase()),
            current_tag: current.into(),
            new_tag: new.into(),
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn unchanged_and_empty_entries_are_skipped() {
        assert!(!should_process(&release("a", "", ""), true));
        assert!(!should_process(&release("a", "v1", "v1"), false));
        assert!(should_process(&release("a", "v1", "v1"), true));
        assert!(should_process(&release("a", "v1", "v2"), false));
    }

    #[test]
    fn plans_follow_tag_presence() {
        assert_eq!(plan(&release("a", "", "v1")), ServicePlan::NewService);
        assert_eq!(plan(&release("a", "v1", "")), ServicePlan::NoNewVersion);
        assert_eq!(plan(&release("a", "v1", "v2")), ServicePlan::Compare);
    }

    #[test]
    fn report_counts_and_labels() {
        let mut tally = BatchTally::new(4);
        tally.skip();
        tally.record(ServiceTicketResult::success(
            &release("ui", "v1", "v2"),
            "o/ui".into(),
            ["AB-2", "AB-1"].iter().map(|s| s.to_string()).collect(),
        ));
        tally.record(ServiceTicketResult::success(
            &release("appcd", "v3", "v4"),
            "o/appcd".into(),
            ["AB-1", "CD-9"].iter().map(|s| s.to_string()).collect(),
        ));
        tally.record(ServiceTicketResult::failed(
            &release("vault", "v1", "v9"),
            "o/vault".into(),
            "not found",
        ));

        let details: TicketDetails = [
            (
                "AB-1".to_string(),
                Ok(TicketDetail {
                    identifier: "AB-1".into(),
                    title: "Fix login".into(),
                    state: "Done".into(),
                    priority: None,
                    assignee: "Dana".into(),
                    project: None,
                }),
            ),
            ("CD-9".to_string(), Err(TrackerError::TicketNotFound("CD-9".into()))),
        ]
        .into_iter()
        .collect();

        let report = tally.into_report(Some(&details), at());
        assert_eq!(report.metadata.total_services, 4);
        assert_eq!(report.metadata.processed, 2);
        assert_eq!(report.metadata.skipped, 1);
        assert_eq!(report.metadata.failed, 1);
        assert_eq!(report.metadata.total_unique_tickets, 3);
        assert_eq!(report.all_tickets, vec!["AB-1: Fix login", "AB-2", "CD-9"]);
        assert_eq!(report.tickets_by_project["AB"], vec!["AB-1", "AB-2"]);
        assert_eq!(report.services[0].tickets, vec!["AB-1", "AB-2"]);
        assert_eq!(report.services[2].error.as_deref(), Some("not found"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["services"][2]["status"], "error");
        assert_eq!(json["metadata"]["generated_at"], "2025-07-10T08:00:00");

        let summary = format_batch_summary(&report);
        assert!(summary.contains("Failed: 1\n"));
        assert!(summary.contains("  - AB: 2 tickets\n"));
    }

    #[test]
    fn request_lines_parse_in_both_forms() {
        let want = RepoRequest {
            repo: "appcd-dev/iac-gen".into(),
            from_tag: "v0.56.0".into(),
            to_tag: "v0.58.0".into(),
        };
        assert_eq!(RepoRequest::parse("appcd-dev/iac-gen:v0.56.0:v0.58.0"), Some(want.clone()));
        assert_eq!(RepoRequest::parse("  appcd-dev/iac-gen  v0.56.0 v0.58.0 "), Some(want.clone()));
        assert_eq!(RepoRequest::parse("appcd-dev/iac-gen:v0.56.0"), None);
        assert_eq!(RepoRequest::parse("a b"), None);
        assert_eq!(RepoRequest::parse(""), None);
        assert_eq!(
            want.default_output_file(),
            "tickets_appcd-dev_iac-gen_v0.56.0_to_v0.58.0.txt"
        );
        assert!(is_ignorable_line("  # comment"));
    }

    #[test]
    fn repo_batch_summary_lists_both_outcomes() {
        let req = |r: &str| RepoRequest::parse(r).unwrap();
        let outcomes = vec![
            RepoRequestOutcome {
                request: req("o/a v1 v2"),
                ticket_count: 3,
                output_file: "tickets_o_a_v1_to_v2.txt".into(),
                timestamp: at(),
                error: None,
            },
            RepoRequestOutcome {
                request: req("o/b v1 v2"),
                ticket_count: 0,
                output_file: "tickets_o_b_v1_to_v2.txt".into(),
                timestamp: at(),
                error: Some("not found".into()),
            },
        ];

        let out = format_repo_batch_summary(&outcomes, at());
        assert!(out.contains("Total requests processed: 2\nSuccessful requests: 1\nFailed requests: 1\nTotal tickets found: 3\n"));
        assert!(out.contains("o/a (v1 -> v2): 3 tickets\n  Output file: tickets_o_a_v1_to_v2.txt\n"));
        assert!(out.contains("o/b (v1 -> v2)\n  Error: not found\n"));
        assert_eq!(default_summary_file(at()), "ticket_processing_summary_20250710_080000.txt");
    }
}
