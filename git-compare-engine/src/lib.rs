//! GitHub access for release comparisons.
//!
//! Downloads repository files (the `.env` with pinned service versions),
//! checks tags and compares two refs into a [`TagComparison`] with commits
//! and changed files. [`report`] renders comparisons for the console.

pub mod errors;
pub mod git_providers;
pub mod report;

pub use errors::{GitCompareConfigError, GitCompareError, GitCompareResult};
pub use git_providers::{
    ChangedFile, CompareCommit, FileStatus, GitHubClient, GitHubConfig, TagComparison,
    repo_path_from_url, resolve_repo, split_owner_repo,
};
pub use report::{ReportSections, format_comparison};
