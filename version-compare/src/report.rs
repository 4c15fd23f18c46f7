//! Console rendering of a [`ComparisonReport`].

use std::fmt::Write;

use crate::reconcile::{ComparisonReport, UnifiedComparisonRecord};

pub const NO_DIFFERENCE: &str = "There is no difference in the deployed versions and latest version";

const NA: &str = "N/A";

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NA)
}

/// Renders the report body (without banners). Matches are listed only when
/// `show_matches` is set and something else differs.
pub fn format_report(report: &ComparisonReport, show_matches: bool) -> String {
    if !report.has_differences() {
        return format!("{NO_DIFFERENCE}\n");
    }

    let mut out = String::new();

    if !report.differences.is_empty() {
        out.push_str("VERSION DIFFERENCES DETECTED:\n\n");
        for r in &report.differences {
            write_difference(&mut out, r);
        }
    }

    if !report.env_only.is_empty() {
        out.push_str("SERVICES ONLY IN .ENV:\n\n");
        for r in &report.env_only {
            let _ = writeln!(out, "   {}: {} (not deployed)", or_na(&r.env_name), or_na(&r.env_version));
        }
        out.push('\n');
    }

    if !report.deployed_only.is_empty() {
        out.push_str("SERVICES ONLY IN DEPLOYED:\n\n");
        for r in &report.deployed_only {
            let _ = writeln!(
                out,
                "   {}: {} (not in .env)",
                or_na(&r.deployed_name),
                or_na(&r.deployed_version)
            );
        }
        out.push('\n');
    }

    if show_matches && !report.matches.is_empty() {
        out.push_str("MATCHING VERSIONS:\n\n");
        for r in &report.matches {
            let _ = writeln!(
                out,
                "   {} -> {}: {}",
                or_na(&r.env_name),
                or_na(&r.deployed_name),
                or_na(&r.env_version)
            );
        }
        out.push('\n');
    }

    out
}

fn write_difference(out: &mut String, r: &UnifiedComparisonRecord) {
    let _ = writeln!(
        out,
        "{} -> {}:",
        or_na(&r.env_name).to_uppercase(),
        or_na(&r.deployed_name).to_uppercase()
    );
    let _ = writeln!(out, "   Repository (.env): {}", or_na(&r.env_version));
    let _ = writeln!(out, "   Deployed: {}", or_na(&r.deployed_version));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VersionMap;
    use crate::reconcile::compare_versions;

    fn map(pairs: &[(&str, &str)]) -> VersionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn identical_maps_print_the_no_difference_line() {
        let report = compare_versions(&map(&[("appcd", "v1")]), &map(&[("appcd", "v1")]));
        assert_eq!(format_report(&report, true), format!("{NO_DIFFERENCE}\n"));
    }

    #[test]
    fn sections_render_in_order() {
        let report = compare_versions(
            &map(&[("appcd", "v0.65.4"), ("llm_gateway", "v0.6.3"), ("iacgen", "v1")]),
            &map(&[("appcd", "v2025.7.10"), ("exporter", "v0.9.9"), ("iac-gen", "v1")]),
        );

        let quiet = format_report(&report, false);
        assert!(quiet.contains("APPCD -> APPCD:\n   Repository (.env): v0.65.4\n   Deployed: v2025.7.10\n"));
        assert!(quiet.contains("   llm_gateway: v0.6.3 (not deployed)\n"));
        assert!(quiet.contains("   exporter: v0.9.9 (not in .env)\n"));
        assert!(!quiet.contains("MATCHING VERSIONS"));

        let diff_at = quiet.find("VERSION DIFFERENCES").unwrap();
        let env_at = quiet.find("SERVICES ONLY IN .ENV").unwrap();
        let dep_at = quiet.find("SERVICES ONLY IN DEPLOYED").unwrap();
        assert!(diff_at < env_at && env_at < dep_at);

        let verbose = format_report(&report, true);
        assert!(verbose.contains("   iacgen -> iac-gen: v1\n"));
    }
}
