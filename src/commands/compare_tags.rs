use anyhow::{Context, Result};
use git_compare_engine::{ReportSections, format_comparison, resolve_repo};

use super::{RunContext, banner, fetcher, github_client, warn_missing_tags};
use crate::cli::CompareTagsArgs;

pub async fn run(args: CompareTagsArgs, _ctx: &RunContext) -> Result<()> {
    let fetcher = fetcher()?;
    let github = github_client(&fetcher)?;
    let repo = resolve_repo(&args.repo)?;

    warn_missing_tags(&github, &repo, [args.from_tag.as_str(), args.to_tag.as_str()]).await?;

    let cmp = github
        .compare(&repo, &args.from_tag, &args.to_tag)
        .await
        .with_context(|| format!("failed to compare {}...{} in {repo}", args.from_tag, args.to_tag))?;

    if args.messages {
        println!("{}", cmp.commit_messages());
        return Ok(());
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&cmp)?);
        return Ok(());
    }

    let sections = ReportSections {
        commits: !args.no_commits,
        files: !args.no_files,
        details: args.details,
    };
    banner("TAG COMPARISON");
    print!("{}", format_comparison(&cmp, &sections));
    Ok(())
}
