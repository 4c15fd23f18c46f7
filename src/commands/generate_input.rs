use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use remote_fetch::{RemoteFetcher, RequestOptions};
use tracing::warn;
use version_compare::environment::version_url;
use version_compare::{
    DeployedVersions, ManifestError, generate_releases_from_deployed, parse_deployed,
    parse_env_assignments,
};

use super::{RunContext, fetcher};
use crate::cli::{DEFAULT_VERSION_HOST, GenerateInputArgs};
use crate::output::{to_json, write_atomic};

async fn fetch(fetcher: &RemoteFetcher, url: &str, timeout: Duration) -> Result<String> {
    fetcher
        .get_text(url, RequestOptions::default().timeout(timeout))
        .await
        .with_context(|| format!("failed to fetch {url}"))
}

pub async fn run(args: GenerateInputArgs, ctx: &RunContext) -> Result<()> {
    let fetcher = fetcher()?;
    let timeout = Duration::from_secs(args.timeout);
    let version_url = args
        .version_url
        .clone()
        .unwrap_or_else(|| version_url(DEFAULT_VERSION_HOST, &ctx.domain));

    let rule = "=".repeat(70);
    println!("{rule}");
    println!("Generating release manifest");
    println!("{rule}");

    println!("\nFetching current versions from: {version_url}");
    let deployed = parse_deployed(&fetch(&fetcher, &version_url, timeout).await?);
    match &deployed {
        DeployedVersions::Structured(map) => println!("Current versions: {} keys", map.len()),
        DeployedVersions::PlainText(_) => {
            return Err(ManifestError::DeployedNotJson)
                .with_context(|| format!("unusable response from {version_url}"));
        }
    }

    let env_text = match (&args.env_file, &args.env_url) {
        (Some(path), url) => {
            if url.is_some() {
                warn!("both --env-url and --env-file given, using --env-file");
            }
            println!("\nReading new versions from local file: {}", path.display());
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        (None, Some(url)) => {
            println!("\nFetching new versions from: {url}");
            fetch(&fetcher, url, timeout).await?
        }
        (None, None) => anyhow::bail!("either --env-url or --env-file must be provided"),
    };
    let env_vars = parse_env_assignments(&env_text);
    println!("New versions: {} keys", env_vars.len());

    let releases = generate_releases_from_deployed(&deployed, &env_vars)?;
    write_atomic(&args.output, &to_json(&releases, args.pretty)?)?;
    println!(
        "{}",
        format!(
            "Wrote {} service entries to: {}",
            releases.len(),
            args.output.display()
        )
        .green()
    );

    println!("\n{rule}");
    println!("Summary:");
    println!("{rule}");
    for r in &releases {
        let marker = if r.current_tag != r.new_tag { "*" } else { " " };
        println!("{marker} {:25} {:20} -> {}", r.service, r.current_tag, r.new_tag);
    }
    Ok(())
}
