//! `.env` readers.
//!
//! Two flavours:
//! - [`parse_env`] extracts service versions using an ordered list of
//!   naming patterns and normalizes keys to lowercase service names.
//! - [`parse_env_assignments`] keeps every `KEY=VALUE` pair verbatim, for
//!   callers that address variables by their exact uppercase name.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::VersionMap;

/// Version patterns in priority order. Group 1 is the service, group 2 the
/// version. All are anchored at the start of the (trimmed) line.
static VERSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // SERVICE_VERSION=1.2.3
        r#"(?i)^(\w+)_VERSION\s*=\s*["']?([^\s"']+)["']?"#,
        // VERSION_SERVICE=1.2.3
        r#"(?i)^VERSION_(\w+)\s*=\s*["']?([^\s"']+)["']?"#,
        // SERVICE_TAG=v1.2.3
        r#"(?i)^(\w+)_TAG\s*=\s*["']?([^\s"']+)["']?"#,
        // IMAGE_SERVICE=repo:tag
        r#"(?i)^IMAGE_(\w+)\s*=\s*["']?[^:]+:([^\s"']+)["']?"#,
        // keys carrying a version without any suffix
        r#"(?i)^(SGAI_ORCHESTRATION|STACKGEN_NOTIFICATIONS|APPCD_ANALYZER|SGAI_KNOWLEDGE|SGAI_CONTROL)\s*=\s*["']?([^\s"']+)["']?"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid env version pattern"))
    .collect()
});

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z_][A-Z0-9_]*)\s*=\s*(.+)$").expect("valid env assignment pattern")
});

/// Extracts service versions from `.env` text.
///
/// Blank lines and `#` comments are ignored. For every other line the first
/// matching pattern wins; lines matching nothing are skipped. A key seen
/// twice keeps its first position and its last value.
pub fn parse_env(text: &str) -> VersionMap {
    let mut versions = VersionMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for re in VERSION_PATTERNS.iter() {
            if let Some(caps) = re.captures(line) {
                let service = caps[1].to_lowercase();
                let version = caps[2].trim().to_string();
                versions.insert(service, version);
                break;
            }
        }
    }

    versions
}

/// Reads raw `KEY=VALUE` assignments, keeping key case and stripping
/// surrounding quotes from values.
pub fn parse_env_assignments(text: &str) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = ASSIGNMENT.captures(line) {
            let value = caps[2].trim().trim_matches('"').trim_matches('\'');
            vars.insert(caps[1].to_string(), value.to_string());
        }
    }

    vars
}
