//! Plain-text rendering of a [`TagComparison`].

use std::fmt::Write;

use crate::git_providers::types::{ChangedFile, CompareCommit, FileStatus, TagComparison};

/// Lines of patch shown per file in detailed mode.
pub const PATCH_PREVIEW_LINES: usize = 10;

/// Which sections [`format_comparison`] renders after the summary.
#[derive(Debug, Clone, Copy)]
pub struct ReportSections {
    pub commits: bool,
    pub files: bool,
    /// Patch previews under each file.
    pub details: bool,
}

impl Default for ReportSections {
    fn default() -> Self {
        Self {
            commits: true,
            files: true,
            details: false,
        }
    }
}

/// Summary, then commits and files as selected. Identical refs stop after
/// the summary.
pub fn format_comparison(cmp: &TagComparison, sections: &ReportSections) -> String {
    let mut out = format_summary(cmp);
    if cmp.is_identical() {
        return out;
    }
    if sections.commits {
        out.push('\n');
        out.push_str(&format_commits(&cmp.commits));
    }
    if sections.files {
        out.push('\n');
        out.push_str(&format_files(&cmp.files, sections.details));
    }
    out
}

pub fn format_summary(cmp: &TagComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}", cmp.repo);
    let _ = writeln!(out, "From: {}", cmp.from_tag);
    let _ = writeln!(out, "To: {}", cmp.to_tag);
    let _ = writeln!(out, "Status: {}", cmp.status);

    if cmp.is_identical() {
        out.push_str("Tags are identical - no differences found\n");
        return out;
    }

    let _ = writeln!(out, "Commits ahead: {}", cmp.ahead_by);
    let _ = writeln!(out, "Commits behind: {}", cmp.behind_by);
    let _ = writeln!(out, "Total commits: {}", cmp.total_commits);
    let _ = writeln!(out, "Files changed: {}", cmp.files.len());
    out
}

/// `  sha7 - title (author, YYYY-MM-DD HH:MM)`
pub fn format_commit_line(c: &CompareCommit) -> String {
    let author = c.author_name.as_deref().unwrap_or("unknown");
    let date = c
        .authored_at
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown date".to_string());
    format!("  {} - {} ({}, {})", c.short_sha(), c.title(), author, date)
}

pub fn format_commits(commits: &[CompareCommit]) -> String {
    if commits.is_empty() {
        return "No commits found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "COMMITS ({}):", commits.len());
    let _ = writeln!(out, "{}", "-".repeat(60));
    for c in commits {
        let _ = writeln!(out, "{}", format_commit_line(c));
    }
    out
}

fn status_marker(status: FileStatus) -> char {
    match status {
        FileStatus::Added => '+',
        FileStatus::Removed => '-',
        _ => '~',
    }
}

pub fn format_files(files: &[ChangedFile], details: bool) -> String {
    if files.is_empty() {
        return "No file changes found\n".to_string();
    }

    let count = |s: FileStatus| files.iter().filter(|f| f.status == s).count();
    let additions: u64 = files.iter().map(|f| f.additions).sum();
    let deletions: u64 = files.iter().map(|f| f.deletions).sum();

    let mut out = String::new();
    let _ = writeln!(out, "FILE CHANGES ({} files):", files.len());
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(
        out,
        "Added: {}, Modified: {}, Deleted: {}",
        count(FileStatus::Added),
        count(FileStatus::Modified),
        count(FileStatus::Removed)
    );
    let _ = writeln!(out, "Total changes: +{additions}/-{deletions}");
    out.push('\n');

    for f in files {
        let _ = write!(
            out,
            "  {} {} ({})",
            status_marker(f.status),
            f.filename,
            f.status.as_str()
        );
        if f.changes > 0 {
            let _ = write!(out, " [+{}/-{}]", f.additions, f.deletions);
        }
        out.push('\n');

        if let (true, Some(patch)) = (details, f.patch.as_deref()) {
            out.push_str("    Diff preview:\n");
            let lines: Vec<&str> = patch.split('\n').collect();
            for line in lines.iter().take(PATCH_PREVIEW_LINES) {
                let _ = writeln!(out, "    {line}");
            }
            if lines.len() > PATCH_PREVIEW_LINES {
                out.push_str("    ... (truncated)\n");
            }
            out.push('\n');
        }
    }
    out
}
