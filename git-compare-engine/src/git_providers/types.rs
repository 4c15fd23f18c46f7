//! Provider-agnostic data model for tag comparisons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of comparing two refs of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagComparison {
    /// `owner/repo`.
    pub repo: String,
    pub from_tag: String,
    pub to_tag: String,
    /// Provider status: `ahead`, `behind`, `diverged`, `identical`.
    pub status: String,
    pub ahead_by: u64,
    pub behind_by: u64,
    pub total_commits: u64,
    pub commits: Vec<CompareCommit>,
    pub files: Vec<ChangedFile>,
}

impl TagComparison {
    pub fn is_identical(&self) -> bool {
        self.status == "identical"
    }

    /// Full commit messages, separated by blank lines.
    pub fn commit_messages(&self) -> String {
        self.commits
            .iter()
            .map(|c| c.message.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// First line of every commit message, one per line. Ticket extraction
    /// reads these, never the bodies.
    pub fn commit_titles(&self) -> String {
        self.commits
            .iter()
            .map(CompareCommit::title)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One commit in a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareCommit {
    pub sha: String,
    /// Full commit message (title plus body).
    pub message: String,
    pub author_name: Option<String>,
    pub authored_at: Option<DateTime<Utc>>,
    pub web_url: Option<String>,
}

impl CompareCommit {
    /// First line of the message.
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// How a file changed between the two refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Unknown => "unknown",
        }
    }
}

/// One changed file in a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    /// Unified diff; absent for binary or oversized files.
    pub patch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn commit(message: &str) -> CompareCommit {
        CompareCommit {
            sha: "0123456789abcdef".into(),
            message: message.into(),
            author_name: None,
            authored_at: None,
            web_url: None,
        }
    }

    #[test]
    fn titles_drop_message_bodies() {
        let cmp = TagComparison {
            repo: "o/r".into(),
            from_tag: "v1".into(),
            to_tag: "v2".into(),
            status: "ahead".into(),
            ahead_by: 3,
            behind_by: 0,
            total_commits: 3,
            commits: vec![
                commit("fix: resolve [AB-123]\n\nReverts part of [AB-1]"),
                commit(""),
                commit("chore: bump"),
            ],
            files: vec![],
        };
        assert_eq!(cmp.commit_titles(), "fix: resolve [AB-123]\n\nchore: bump");
        assert!(!cmp.commit_titles().contains("AB-1]"));
        assert!(cmp.commit_messages().contains("[AB-1]"));
        assert_eq!(cmp.commits[0].short_sha(), "0123456");
    }
}
