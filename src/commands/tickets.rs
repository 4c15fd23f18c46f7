use std::collections::BTreeSet;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use git_compare_engine::{GitHubClient, resolve_repo};
use ticket_tracker::report::{TicketReportHeader, format_ticket_console, format_ticket_file};
use ticket_tracker::{LinearClient, TicketDetails, TicketPattern};

use super::{RunContext, collect_tickets, enrich, fetcher, github_client, linear_client, warn_missing_tags};
use crate::cli::TicketsArgs;
use crate::output::write_atomic;

/// Tickets between two tags, with details when a tracker client is given.
pub(super) struct TicketRun {
    pub tickets: BTreeSet<String>,
    pub details: Option<TicketDetails>,
}

pub(super) async fn extract_for_repo(
    github: &GitHubClient,
    linear: Option<&LinearClient>,
    repo: &str,
    from_tag: &str,
    to_tag: &str,
    pattern: &TicketPattern,
) -> Result<TicketRun> {
    warn_missing_tags(github, repo, [from_tag, to_tag]).await?;
    let (_, tickets) = collect_tickets(github, repo, from_tag, to_tag, pattern).await?;
    let details = enrich(linear, &tickets).await;
    Ok(TicketRun { tickets, details })
}

pub async fn run(args: TicketsArgs, ctx: &RunContext) -> Result<()> {
    let pattern = TicketPattern::from_option(args.pattern.as_deref())?;
    let fetcher = fetcher()?;
    let github = github_client(&fetcher)?;
    let linear = linear_client(&fetcher, &args.tracker)?;
    let repo = resolve_repo(&args.repo)?;

    println!("Extracting tickets from {repo} ({} -> {})", args.from_tag, args.to_tag);
    let run = extract_for_repo(
        &github,
        linear.as_ref(),
        &repo,
        &args.from_tag,
        &args.to_tag,
        &pattern,
    )
    .await?;

    let header = TicketReportHeader {
        repo: &repo,
        from_tag: &args.from_tag,
        to_tag: &args.to_tag,
    };

    match &args.output {
        Some(path) => {
            let text = format_ticket_file(
                &header,
                &run.tickets,
                run.details.as_ref(),
                Local::now().naive_local(),
            );
            write_atomic(path, &text)?;
            println!(
                "{}",
                format!("Found {} tickets - saved to {}", run.tickets.len(), path.display()).green()
            );
        }
        None => {
            println!();
            print!(
                "{}",
                format_ticket_console(&header, &run.tickets, run.details.as_ref(), ctx.verbose)
            );
        }
    }
    Ok(())
}
