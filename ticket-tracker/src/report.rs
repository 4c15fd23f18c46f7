//! Ticket report rendering (text file and console).

use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::extractor::group_by_project;
use crate::linear::TicketDetails;

pub const NO_TICKETS: &str = "No Linear tickets found in the commit messages.";

const RULE_WIDTH: usize = 80;

/// Where the tickets came from.
#[derive(Debug, Clone, Copy)]
pub struct TicketReportHeader<'a> {
    pub repo: &'a str,
    pub from_tag: &'a str,
    pub to_tag: &'a str,
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Writes one ticket entry: `ID: title` plus a state line, or the bare ID
/// with a note when enrichment was attempted and failed.
fn write_entry(out: &mut String, ticket: &str, details: Option<&TicketDetails>) {
    match details.and_then(|d| d.get(ticket)) {
        Some(d) => {
            let _ = writeln!(out, "\n{ticket}: {}", d.title);
            let _ = writeln!(out, "  State: {} | Assignee: {}", d.state, d.assignee);
        }
        None => {
            let _ = writeln!(out, "\n{ticket}");
            if details.is_some() {
                out.push_str("  (Details not available)\n");
            }
        }
    }
}

/// Full text-file report.
pub fn format_ticket_file(
    header: &TicketReportHeader<'_>,
    tickets: &BTreeSet<String>,
    details: Option<&TicketDetails>,
    extracted_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push_str("Linear Tickets Found in Git Tag Comparison\n");
    let _ = writeln!(out, "{}\n", rule());
    let _ = writeln!(out, "Repository: {}", header.repo);
    let _ = writeln!(out, "From Tag: {}", header.from_tag);
    let _ = writeln!(out, "To Tag: {}", header.to_tag);
    let _ = writeln!(
        out,
        "Extraction Date: {}\n",
        extracted_at.format("%Y-%m-%d %H:%M:%S")
    );

    if tickets.is_empty() {
        let _ = writeln!(out, "{NO_TICKETS}");
        return out;
    }

    let _ = writeln!(out, "Total tickets found: {}\n", tickets.len());
    out.push_str("Tickets:\n");
    let _ = writeln!(out, "{}", rule());
    for ticket in tickets {
        write_entry(&mut out, ticket, details);
    }

    let projects = group_by_project(tickets);
    out.push_str("\n\nSummary:\n");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Total unique tickets: {}", tickets.len());
    let names: Vec<&str> = projects.keys().map(String::as_str).collect();
    let _ = writeln!(out, "Projects involved: {}", names.join(", "));
    for (prefix, ids) in &projects {
        let _ = writeln!(out, "  - {prefix}: {} tickets", ids.len());
    }
    out
}

/// Console listing. Compact mode prints one line per ticket; verbose mode
/// adds state lines and a per-project summary.
pub fn format_ticket_console(
    header: &TicketReportHeader<'_>,
    tickets: &BTreeSet<String>,
    details: Option<&TicketDetails>,
    verbose: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Linear Tickets Found in {} ({} -> {})",
        header.repo, header.from_tag, header.to_tag
    );
    let _ = writeln!(out, "{}", rule());

    if tickets.is_empty() {
        let _ = writeln!(out, "{NO_TICKETS}");
        return out;
    }

    if verbose {
        let _ = writeln!(out, "Total tickets found: {}", tickets.len());
        for ticket in tickets {
            write_entry(&mut out, ticket, details);
        }
        out.push_str("\n\nSummary by project:\n");
        for (prefix, ids) in group_by_project(tickets) {
            let _ = writeln!(out, "- {prefix}: {} tickets", ids.len());
        }
    } else {
        let _ = writeln!(out, "Found {} Linear tickets:\n", tickets.len());
        for ticket in tickets {
            let line = details.map_or_else(|| ticket.clone(), |d| d.label(ticket));
            let _ = writeln!(out, "{line}");
        }
    }
    out
}
