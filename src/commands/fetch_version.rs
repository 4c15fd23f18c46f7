use std::time::Duration;

use anyhow::{Context, Result};
use remote_fetch::RequestOptions;
use serde_json::Value;
use version_compare::environment::version_url;

use super::{RunContext, fetcher};
use crate::cli::FetchVersionArgs;
use crate::prompt;

pub async fn run(args: FetchVersionArgs, ctx: &RunContext) -> Result<()> {
    let url = match args.url {
        Some(url) => url,
        None => {
            let Some(host) = prompt::resolve_environment(args.env.as_deref(), args.interactive).await?
            else {
                return Ok(());
            };
            version_url(&host, &ctx.domain)
        }
    };

    println!("Fetching content from: {url}");
    let opts = RequestOptions::default().timeout(Duration::from_secs(args.timeout));
    let body = fetcher()?
        .get_text(&url, opts)
        .await
        .with_context(|| format!("failed to fetch {url}"))?;

    let parsed = if args.raw {
        None
    } else {
        serde_json::from_str::<Value>(&body).ok()
    };

    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("RESPONSE CONTENT:");
    println!("{rule}");
    match (&parsed, args.pretty) {
        (Some(json), true) => println!("{}", serde_json::to_string_pretty(json)?),
        _ => println!("{}", body.trim_end()),
    }
    println!("{rule}");

    if ctx.verbose {
        println!("Content length: {} characters", body.chars().count());
        match &parsed {
            Some(Value::Object(map)) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                println!("Content type: JSON");
                println!("JSON keys: {}", keys.join(", "));
            }
            Some(_) => println!("Content type: JSON"),
            None => println!("Content type: Plain text"),
        }
    }
    Ok(())
}
