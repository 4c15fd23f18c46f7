use anyhow::{Result, bail};
use colored::Colorize;
use ticket_tracker::linear::priority_label;
use ticket_tracker::{LinearClient, LinearConfig, TrackerError};

use super::{RunContext, fetcher};
use crate::cli::LinearCheckArgs;

fn hint_for(err: &TrackerError) {
    if let TrackerError::Fetch(e) = err {
        if e.is_unauthorized() {
            eprintln!("   Get a new API key from: https://linear.app/settings/api");
        }
    }
}

pub async fn run(args: LinearCheckArgs, _ctx: &RunContext) -> Result<()> {
    let rule = "=".repeat(60);
    println!("Testing Linear API Connection...");
    println!("{rule}");

    let cfg = LinearConfig::from_env(args.api_key)?;
    println!("API key found (starts with: {})", cfg.key_preview());
    let client = LinearClient::new(fetcher()?, cfg);

    println!("\nTest 1: Verifying API key...");
    let viewer = match client.check_connection().await {
        Ok(v) => v,
        Err(e) => {
            hint_for(&e);
            return Err(e.into());
        }
    };
    println!("{}", "API key is valid!".green());
    println!("  Logged in as: {}", viewer.name.as_deref().unwrap_or("Unknown"));
    println!("  Email: {}", viewer.email.as_deref().unwrap_or("Unknown"));

    if let Some(ticket) = &args.ticket {
        println!("\nTest 2: Fetching ticket {ticket}...");
        match client.fetch_ticket(ticket).await {
            Ok(d) => {
                println!("{}", "Successfully fetched ticket!".green());
                println!("  ID: {}", d.identifier);
                println!("  Title: {}", d.title);
                println!("  State: {}", d.state);
                println!("  Priority: {}", priority_label(d.priority));
                println!("  Assignee: {}", d.assignee);
                println!("  Project: {}", d.project.as_deref().unwrap_or("Unknown"));
            }
            Err(TrackerError::TicketNotFound(id)) => {
                eprintln!("   Possible reasons:");
                eprintln!("   - Ticket doesn't exist in your Linear workspace");
                eprintln!("   - You don't have permission to view this ticket");
                eprintln!("   - Ticket ID format is incorrect (should be PROJ-123)");
                bail!("ticket {id} not found");
            }
            Err(e) => {
                hint_for(&e);
                return Err(e.into());
            }
        }
    }

    println!("\n{rule}");
    println!("{}", "All tests passed! Linear API is working correctly.".green());
    Ok(())
}
