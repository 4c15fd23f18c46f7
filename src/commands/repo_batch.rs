use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use git_compare_engine::{GitHubClient, resolve_repo};
use ticket_tracker::batch::{default_summary_file, format_repo_batch_summary, is_ignorable_line};
use ticket_tracker::report::{TicketReportHeader, format_ticket_file};
use ticket_tracker::{LinearClient, RepoRequest, RepoRequestOutcome, TicketPattern};

use super::tickets::extract_for_repo;
use super::{RunContext, fetcher, github_client, linear_client};
use crate::cli::RepoBatchArgs;
use crate::output::write_atomic;
use crate::prompt::read_line;

const FORMAT_HINT: &str = "Format: owner/repo:from_tag:to_tag or owner/repo from_tag to_tag";

struct Processor<'a> {
    github: &'a GitHubClient,
    linear: Option<&'a LinearClient>,
    pattern: TicketPattern,
    outcomes: Vec<RepoRequestOutcome>,
}

impl Processor<'_> {
    async fn handle(&mut self, request: RepoRequest) {
        println!(
            "\n[{}] Processing: {} ({} -> {})",
            self.outcomes.len() + 1,
            request.repo,
            request.from_tag,
            request.to_tag
        );
        let output_file = request.default_output_file();

        let result = self.produce(&request, Path::new(&output_file)).await;
        let (ticket_count, error) = match result {
            Ok(count) => {
                println!(
                    "{}",
                    format!("  Found {count} tickets - saved to {output_file}").green()
                );
                (count, None)
            }
            Err(e) => {
                let msg = format!("{e:#}");
                println!("{}", format!("  Failed: {msg}").red());
                (0, Some(msg))
            }
        };

        self.outcomes.push(RepoRequestOutcome {
            request,
            ticket_count,
            output_file,
            timestamp: Local::now().naive_local(),
            error,
        });
    }

    async fn produce(&self, request: &RepoRequest, output: &Path) -> Result<usize> {
        let repo = resolve_repo(&request.repo)?;
        let run = extract_for_repo(
            self.github,
            self.linear,
            &repo,
            &request.from_tag,
            &request.to_tag,
            &self.pattern,
        )
        .await?;

        let header = TicketReportHeader {
            repo: &repo,
            from_tag: &request.from_tag,
            to_tag: &request.to_tag,
        };
        let text = format_ticket_file(
            &header,
            &run.tickets,
            run.details.as_ref(),
            Local::now().naive_local(),
        );
        write_atomic(output, &text)?;
        Ok(run.tickets.len())
    }

    async fn handle_lines(&mut self, text: &str) {
        for line in text.lines().filter(|l| !is_ignorable_line(l)) {
            match RepoRequest::parse(line) {
                Some(request) => self.handle(request).await,
                None => println!(
                    "  [{}] Invalid format: {}",
                    self.outcomes.len() + 1,
                    line.trim()
                ),
            }
        }
    }

    async fn interactive(&mut self) -> Result<()> {
        println!("Interactive Repository Ticket Processor");
        println!("{}", "=".repeat(50));
        println!("{FORMAT_HINT}");
        println!("\nType 'quit' or 'exit' to finish, 'help' for examples");
        println!("{}", "-".repeat(50));

        loop {
            let prompt = format!("\n[{}] Enter repo and tags: ", self.outcomes.len() + 1);
            let Some(input) = read_line(prompt).await? else {
                break;
            };
            match input.to_lowercase().as_str() {
                "quit" | "exit" | "q" => break,
                "help" => {
                    println!("\nExamples:");
                    println!("  appcd-dev/iac-gen:v0.56.0:v0.58.0");
                    println!("  appcd-dev/appcd v0.67.0 v0.68.0");
                    println!("  owner/repo main develop");
                    continue;
                }
                "" => continue,
                _ => {}
            }
            match RepoRequest::parse(&input) {
                Some(request) => self.handle(request).await,
                None => println!("{}", "  Invalid format. Use: owner/repo:from_tag:to_tag".red()),
            }
        }
        Ok(())
    }
}

async fn read_stdin() -> Result<String> {
    tokio::task::spawn_blocking(|| {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    })
    .await
    .context("stdin task failed")?
    .context("failed to read stdin")
}

pub async fn run(args: RepoBatchArgs, _ctx: &RunContext) -> Result<()> {
    let fetcher = fetcher()?;
    let github = github_client(&fetcher)?;
    let linear = linear_client(&fetcher, &args.tracker)?;

    let mut processor = Processor {
        github: &github,
        linear: linear.as_ref(),
        pattern: TicketPattern::default(),
        outcomes: Vec::new(),
    };

    if args.interactive {
        processor.interactive().await?;
    } else if let Some(path) = &args.input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        let count = text.lines().filter(|l| !is_ignorable_line(l)).count();
        println!("Processing {count} requests from {}...", path.display());
        println!("{}", "=".repeat(60));
        processor.handle_lines(&text).await;
    } else {
        println!("Reading repository and tag combinations from stdin...");
        println!("{FORMAT_HINT}");
        println!("Press Ctrl+D when done");
        println!("{}", "-".repeat(50));
        let text = read_stdin().await?;
        processor.handle_lines(&text).await;
    }

    let outcomes = processor.outcomes;
    let ok = outcomes.iter().filter(|o| o.is_success()).count();
    let total_tickets: usize = outcomes
        .iter()
        .filter(|o| o.is_success())
        .map(|o| o.ticket_count)
        .sum();

    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("PROCESSING SUMMARY");
    println!("{rule}");
    println!("Total requests: {}", outcomes.len());
    println!("Successful: {ok}");
    println!("Failed: {}", outcomes.len() - ok);
    println!("Total tickets found: {total_tickets}");

    if outcomes.is_empty() {
        return Ok(());
    }

    let now = Local::now().naive_local();
    let summary_path = args
        .summary
        .unwrap_or_else(|| PathBuf::from(default_summary_file(now)));
    write_atomic(&summary_path, &format_repo_batch_summary(&outcomes, now))?;
    println!("\nSummary report saved to: {}", summary_path.display());
    Ok(())
}
