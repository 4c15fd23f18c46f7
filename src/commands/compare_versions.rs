use anyhow::{Context, Result};
use colored::Colorize;
use git_compare_engine::resolve_repo;
use remote_fetch::RequestOptions;
use tracing::info;
use version_compare::environment::version_url;
use version_compare::report::{NO_DIFFERENCE, format_report};
use version_compare::{VersionMap, compare_versions, parse_deployed, parse_env};

use super::{RunContext, banner, emphasize_headings, fetcher, github_client};
use crate::cli::CompareVersionsArgs;
use crate::prompt;

const PREVIEW_CHARS: usize = 500;

/// The first `limit` characters of `text`, with `...` appended when cut.
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn format_versions(versions: &VersionMap) -> String {
    versions
        .iter()
        .map(|(key, version)| format!("  {key}: {version}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_section(title: &str, body: &str) {
    let rule = "-".repeat(40);
    println!("\n{title}");
    println!("{rule}");
    println!("{body}");
    println!("{rule}");
}

pub async fn run(args: CompareVersionsArgs, ctx: &RunContext) -> Result<()> {
    let fetcher = fetcher()?;
    let github = github_client(&fetcher)?;
    let repo = resolve_repo(&args.repo)?;

    let Some(host) = prompt::resolve_environment(args.environment.as_deref(), false).await? else {
        return Ok(());
    };
    let url = version_url(&host, &ctx.domain);

    if !args.json {
        banner("COMPARING VERSIONS");
        println!("Repository: {repo}");
        println!("Branch: {}", args.branch);
        println!("Env file: {}", args.env_file);
        println!("Environment: {host}");
        println!("Deployed manifest: {url}");
    }

    let env_text = github
        .fetch_file(&repo, &args.env_file, &args.branch)
        .await
        .with_context(|| format!("failed to fetch {} from {repo}@{}", args.env_file, args.branch))?;
    let show_inputs = ctx.verbose && !args.json;
    if show_inputs {
        print_section(".env file content preview:", &preview(&env_text, PREVIEW_CHARS));
    }
    let deployed_text = fetcher
        .get_text(&url, RequestOptions::default())
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    if show_inputs {
        print_section("Deployed version content:", &deployed_text);
    }

    let env_map = parse_env(&env_text);
    let deployed_map = parse_deployed(&deployed_text).into_version_map();
    info!(env = env_map.len(), deployed = deployed_map.len(), "versions parsed");
    if show_inputs {
        print_section("Parsed repository versions:", &format_versions(&env_map));
        print_section("Parsed deployed versions:", &format_versions(&deployed_map));
    }

    let report = compare_versions(&env_map, &deployed_map);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    banner("COMPARISON RESULTS");
    let body = format_report(&report, ctx.verbose);
    if report.has_differences() {
        println!("{}", emphasize_headings(&body));
        println!(
            "Summary: {} differing, {} only in .env, {} only deployed, {} matching",
            report.differences.len(),
            report.env_only.len(),
            report.deployed_only.len(),
            report.matches.len()
        );
    } else {
        println!("{}", NO_DIFFERENCE.green());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preview_cuts_on_character_boundaries() {
        assert_eq!(preview("APPCD_VERSION=v1", 500), "APPCD_VERSION=v1");
        assert_eq!(preview("abcdef", 6), "abcdef");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééééé", 2), "éé...");

        let long = "X".repeat(PREVIEW_CHARS + 20);
        assert_eq!(preview(&long, PREVIEW_CHARS).len(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn parsed_versions_list_one_per_line() {
        let mut versions = VersionMap::new();
        versions.insert("appcd".into(), "v0.65.4".into());
        versions.insert("ui".into(), "v0.17.2".into());
        assert_eq!(format_versions(&versions), "  appcd: v0.65.4\n  ui: v0.17.2");
        assert_eq!(format_versions(&VersionMap::new()), "");
    }
}
