//! Ticket identifier extraction.
//!
//! Identifiers are only recognised inside square brackets (`[AB-123]`), so
//! bare mentions such as `UTF-8` in prose are never picked up.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::TrackerConfigError;

/// Key pattern used when the caller does not supply one.
pub const DEFAULT_KEY_PATTERN: &str = r"[A-Z]{2,6}-\d{1,6}";

static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&bracketed(DEFAULT_KEY_PATTERN)).expect("valid default ticket pattern")
});

fn bracketed(inner: &str) -> String {
    format!(r"\[({inner})\]")
}

/// Compiled ticket pattern. Capture group 1 is the identifier.
#[derive(Debug, Clone)]
pub struct TicketPattern {
    regex: Regex,
}

impl Default for TicketPattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_PATTERN.clone(),
        }
    }
}

impl TicketPattern {
    /// Wraps a caller key pattern in literal brackets: `\[(inner)\]`.
    pub fn custom(inner: &str) -> Result<Self, TrackerConfigError> {
        let regex =
            Regex::new(&bracketed(inner)).map_err(|source| TrackerConfigError::InvalidPattern {
                pattern: inner.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }

    /// `custom` when a pattern is given, otherwise the default.
    pub fn from_option(inner: Option<&str>) -> Result<Self, TrackerConfigError> {
        match inner {
            Some(p) => Self::custom(p),
            None => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        extract(text, self)
    }
}

/// Distinct identifiers found in `text`, sorted.
pub fn extract(text: &str, pattern: &TicketPattern) -> BTreeSet<String> {
    pattern
        .regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Project key of an identifier: everything before the first `-`.
pub fn project_prefix(ticket: &str) -> &str {
    ticket.split('-').next().unwrap_or(ticket)
}

/// Groups identifiers by project key. Keys and values are sorted.
pub fn group_by_project<'a, I>(tickets: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut projects: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for ticket in tickets {
        projects
            .entry(project_prefix(ticket).to_string())
            .or_default()
            .push(ticket.clone());
    }
    for ids in projects.values_mut() {
        ids.sort();
        ids.dedup();
    }
    projects
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bracketed_ids_are_deduplicated_and_sorted() {
        let found = extract(
            "fix: resolve issue [AB-123] and [ABCD-4567] duplicate [AB-123]",
            &TicketPattern::default(),
        );
        assert_eq!(found, set(&["AB-123", "ABCD-4567"]));
    }

    #[test]
    fn unbracketed_and_out_of_range_ids_are_ignored() {
        let found = TicketPattern::default().extract(
            "UTF-8 AB-1 [A-1] [ABCDEFG-1] [ab-12] [AB-1234567] [XY-9]",
        );
        assert_eq!(found, set(&["XY-9"]));
    }

    #[test]
    fn no_matches_is_empty() {
        assert!(TicketPattern::default().extract("chore: bump deps").is_empty());
    }

    #[test]
    fn custom_patterns_are_bracketed() {
        let p = TicketPattern::custom(r"ENG-\d+").unwrap();
        assert_eq!(p.as_str(), r"\[(ENG-\d+)\]");
        assert_eq!(p.extract("[ENG-42] ENG-7 [OPS-1]"), set(&["ENG-42"]));
    }

    #[test]
    fn invalid_custom_pattern_is_a_config_error() {
        let err = TicketPattern::custom("([A-Z").unwrap_err();
        assert!(matches!(err, TrackerConfigError::InvalidPattern { .. }));
        assert!(err.to_string().contains("([A-Z"));
    }

    #[test]
    fn grouping_by_project_prefix() {
        let tickets = set(&["AE-3", "AB-2", "AE-10", "AB-1"]);
        let grouped = group_by_project(&tickets);
        assert_eq!(
            grouped.into_iter().collect::<Vec<_>>(),
            vec![
                ("AB".to_string(), vec!["AB-1".to_string(), "AB-2".to_string()]),
                ("AE".to_string(), vec!["AE-10".to_string(), "AE-3".to_string()]),
            ]
        );
        assert_eq!(project_prefix("ENG-42"), "ENG");
    }

    proptest! {
        #[test]
        fn every_extracted_id_appears_bracketed(text in "[\\[\\]A-Z0-9 -]{0,64}") {
            for id in TicketPattern::default().extract(&text) {
                let needle = format!("[{id}]");
                prop_assert!(text.contains(&needle));
            }
        }
    }
}
