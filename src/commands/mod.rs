//! One module per tool. Everything runs in-process on the shared clients.

mod compare_tags;
mod compare_versions;
mod fetch_version;
mod generate_input;
mod linear_check;
mod process_all;
mod repo_batch;
mod tickets;

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use colored::Colorize;
use git_compare_engine::{GitHubClient, GitHubConfig, TagComparison};
use remote_fetch::RemoteFetcher;
use ticket_tracker::{LinearClient, LinearConfig, TicketDetails, TicketPattern};
use tracing::{info, warn};

use crate::cli::{Cli, Command, TrackerArgs};
use crate::progress::IndicatifProgress;

/// Global options every tool may need.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub domain: String,
    pub verbose: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = RunContext {
        domain: cli.domain,
        verbose: cli.verbose,
    };
    match cli.command {
        Command::FetchVersion(args) => fetch_version::run(args, &ctx).await,
        Command::CompareVersions(args) => compare_versions::run(args, &ctx).await,
        Command::CompareTags(args) => compare_tags::run(args, &ctx).await,
        Command::Tickets(args) => tickets::run(args, &ctx).await,
        Command::GenerateInput(args) => generate_input::run(args, &ctx).await,
        Command::ProcessAll(args) => process_all::run(args, &ctx).await,
        Command::RepoBatch(args) => repo_batch::run(args, &ctx).await,
        Command::LinearCheck(args) => linear_check::run(args, &ctx).await,
    }
}

fn fetcher() -> Result<RemoteFetcher> {
    RemoteFetcher::new().context("failed to build HTTP client")
}

fn github_client(fetcher: &RemoteFetcher) -> Result<GitHubClient> {
    let cfg = GitHubConfig::from_env()?;
    Ok(GitHubClient::new(fetcher.clone(), cfg))
}

/// `None` when enrichment is switched off; a missing key otherwise is a
/// configuration error.
fn linear_client(fetcher: &RemoteFetcher, args: &TrackerArgs) -> Result<Option<LinearClient>> {
    if args.no_fetch_details {
        return Ok(None);
    }
    let cfg = LinearConfig::from_env(args.api_key.clone())?;
    Ok(Some(LinearClient::new(fetcher.clone(), cfg)))
}

fn banner(title: &str) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("{}", title.bold());
    println!("{rule}");
}

fn is_heading(line: &str) -> bool {
    line.ends_with(':')
        && !line.starts_with(' ')
        && line.chars().any(|c| c.is_ascii_alphabetic())
        && !line.chars().any(|c| c.is_ascii_lowercase())
}

/// Bolds upper-case section headings in a plain report.
fn emphasize_headings(report: &str) -> String {
    report
        .lines()
        .map(|line| {
            if is_heading(line) {
                line.bold().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Warns about tags the repository does not have. The comparison itself
/// decides whether that is fatal.
async fn warn_missing_tags(github: &GitHubClient, repo: &str, tags: [&str; 2]) -> Result<()> {
    for tag in tags {
        if !github.tag_exists(repo, tag).await? {
            let msg = format!("Warning: tag '{tag}' not found in {repo}");
            warn!(repo, tag, "tag not found");
            eprintln!("{}", msg.yellow());
        }
    }
    Ok(())
}

/// Compares two refs and pulls ticket identifiers out of the commit titles.
async fn collect_tickets(
    github: &GitHubClient,
    repo: &str,
    from_tag: &str,
    to_tag: &str,
    pattern: &TicketPattern,
) -> Result<(TagComparison, BTreeSet<String>)> {
    let cmp = github
        .compare(repo, from_tag, to_tag)
        .await
        .with_context(|| format!("failed to compare {from_tag}...{to_tag} in {repo}"))?;
    let tickets = pattern.extract(&cmp.commit_titles());
    info!(repo, commits = cmp.commits.len(), tickets = tickets.len(), "tickets extracted");
    Ok((cmp, tickets))
}

/// Looks up every ticket with a progress bar. `None` when there is no client
/// or nothing to look up.
async fn enrich(linear: Option<&LinearClient>, tickets: &BTreeSet<String>) -> Option<TicketDetails> {
    let linear = linear?;
    if tickets.is_empty() {
        return None;
    }
    println!("\nFetching Linear ticket details for {} unique tickets...", tickets.len());
    let progress = IndicatifProgress::bar(tickets.len() as u64);
    Some(linear.fetch_all(tickets, &progress).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_uppercase_section_lines_are_headings() {
        assert!(is_heading("VERSION DIFFERENCES DETECTED:"));
        assert!(is_heading("SERVICES ONLY IN .ENV:"));
        assert!(is_heading("APPCD -> APPCD:"));
        assert!(!is_heading("   Deployed: v1"));
        assert!(!is_heading("Tickets by project:"));
        assert!(!is_heading(""));
    }
}
