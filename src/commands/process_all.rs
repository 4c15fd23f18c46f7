use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use git_compare_engine::{GitHubClient, repo_path_from_url};
use ticket_tracker::batch::{ServicePlan, format_batch_summary, plan};
use ticket_tracker::{BatchTally, ServiceTicketResult, TicketPattern, should_process};
use tracing::warn;
use version_compare::{ServiceRelease, load_releases};

use super::{RunContext, collect_tickets, enrich, fetcher, github_client, linear_client};
use crate::cli::ProcessAllArgs;
use crate::output::{to_json, write_atomic};

/// Large compares can be slow.
const COMPARE_TIMEOUT: Duration = Duration::from_secs(120);

fn section(title: &str) {
    let rule = "=".repeat(70);
    println!("{rule}");
    println!("{title}");
    println!("{rule}");
}

async fn process_service(
    github: &GitHubClient,
    release: &ServiceRelease,
    pattern: &TicketPattern,
) -> ServiceTicketResult {
    let repo_path = match repo_path_from_url(&release.repository) {
        Ok(path) => path,
        Err(e) => {
            eprintln!(
                "{}",
                format!("  Invalid repository URL for {}: {e}", release.service).red()
            );
            return ServiceTicketResult::failed(release, String::new(), e.to_string());
        }
    };

    println!(
        "  Processing {} ({} -> {})...",
        release.service, release.current_tag, release.new_tag
    );

    match plan(release) {
        ServicePlan::NewService => {
            println!("     New service detected, skipping (no previous version to compare)");
            ServiceTicketResult::new_service(release, repo_path)
        }
        ServicePlan::NoNewVersion => {
            println!("     No new version specified, skipping");
            ServiceTicketResult::no_new_version(release, repo_path)
        }
        ServicePlan::Compare => {
            match collect_tickets(github, &repo_path, &release.current_tag, &release.new_tag, pattern)
                .await
            {
                Ok((_, tickets)) => {
                    if tickets.is_empty() {
                        println!("     No tickets found");
                    } else {
                        println!("{}", format!("     Found {} tickets", tickets.len()).green());
                    }
                    ServiceTicketResult::success(release, repo_path, tickets)
                }
                Err(e) => {
                    let msg = format!("{e:#}");
                    warn!(service = %release.service, error = %msg, "service failed");
                    eprintln!("{}", format!("     Failed: {msg}").red());
                    ServiceTicketResult::failed(release, repo_path, msg)
                }
            }
        }
    }
}

pub async fn run(args: ProcessAllArgs, _ctx: &RunContext) -> Result<()> {
    let releases = load_releases(&args.input)?;
    let fetcher = fetcher()?;
    let github = github_client(&fetcher)?.with_timeout(COMPARE_TIMEOUT);
    let linear = linear_client(&fetcher, &args.tracker)?;
    let pattern = TicketPattern::default();

    section("Processing All Repositories");
    let total = releases.len();
    let mut tally = BatchTally::new(total);

    for (i, release) in releases.iter().enumerate() {
        println!("\n[{}/{total}] {}", i + 1, release.service);
        if !should_process(release, args.include_unchanged) {
            println!("  Skipping (no changes)");
            tally.skip();
            continue;
        }
        tally.record(process_service(&github, release, &pattern).await);
    }

    let unique = tally.unique_tickets();
    let details = enrich(linear.as_ref(), &unique).await;
    let report = tally.into_report(details.as_ref(), Local::now().naive_local());

    write_atomic(&args.output, &to_json(&report, args.pretty)?)?;

    println!();
    section("Summary");
    print!("{}", format_batch_summary(&report));
    println!(
        "\n{}",
        format!("Results saved to: {}", args.output.display()).green()
    );
    Ok(())
}
