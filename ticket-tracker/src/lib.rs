//! Ticket identifiers between two release tags.
//!
//! Pulls bracketed identifiers (`[AB-123]`) out of commit messages, groups
//! them by project key, optionally enriches them from Linear and renders the
//! single-repository and batch reports.

pub mod batch;
pub mod errors;
pub mod extractor;
pub mod linear;
pub mod progress;
pub mod report;

pub use batch::{
    BatchMetadata, BatchReport, BatchTally, RepoRequest, RepoRequestOutcome, ServicePlan,
    ServiceStatus, ServiceTicketResult, should_process,
};
pub use errors::{TrackerConfigError, TrackerError, TrackerResult};
pub use extractor::{DEFAULT_KEY_PATTERN, TicketPattern, extract, group_by_project};
pub use linear::{LinearClient, LinearConfig, TicketDetail, TicketDetails, Viewer};
pub use progress::{NoopProgress, Progress};
pub use report::{TicketReportHeader, format_ticket_console, format_ticket_file};
