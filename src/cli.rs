//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use version_compare::DEFAULT_DOMAIN;

pub const DEFAULT_INPUT_FILE: &str = "generated_files/input_file/input.json";
pub const DEFAULT_BATCH_OUTPUT: &str = "generated_files/final_tag_differences.json";
pub const DEFAULT_VERSION_HOST: &str = "stage.dev";

#[derive(Debug, Parser)]
#[command(name = "release-diff", version, about = "Compare deployed service versions and collect tickets between release tags")]
pub struct Cli {
    /// Debug logging for this tool and verbose report sections.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Domain the environment hosts live under.
    #[arg(long, global = true, env = "VERSION_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and print an environment's version.json.
    FetchVersion(FetchVersionArgs),
    /// Compare a repository .env against a deployed environment.
    CompareVersions(CompareVersionsArgs),
    /// Compare two tags of a repository.
    CompareTags(CompareTagsArgs),
    /// Extract ticket identifiers from commits between two tags.
    Tickets(TicketsArgs),
    /// Build the release manifest used by process-all.
    GenerateInput(GenerateInputArgs),
    /// Extract tickets for every service in a release manifest.
    ProcessAll(ProcessAllArgs),
    /// Ticket reports for a list of repo/tag requests.
    RepoBatch(RepoBatchArgs),
    /// Check the Linear API key.
    LinearCheck(LinearCheckArgs),
}

#[derive(Debug, Args)]
pub struct FetchVersionArgs {
    /// Environment host prefix (e.g. `stage.dev`). Menu when omitted.
    pub env: Option<String>,

    /// Always show the environment menu.
    #[arg(short, long)]
    pub interactive: bool,

    /// Fetch this URL instead of an environment's version.json.
    #[arg(short, long, conflicts_with_all = ["env", "interactive"])]
    pub url: Option<String>,

    /// Re-indent JSON bodies.
    #[arg(short, long)]
    pub pretty: bool,

    /// Print the body as received.
    #[arg(long, conflicts_with = "pretty")]
    pub raw: bool,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Debug, Args)]
pub struct CompareVersionsArgs {
    /// Repository as `owner/repo` or a GitHub URL.
    pub repo: String,

    /// Path of the .env file inside the repository.
    #[arg(short, long, default_value = ".env")]
    pub env_file: String,

    #[arg(short, long, default_value = "main")]
    pub branch: String,

    /// Environment host prefix. Menu when omitted.
    #[arg(short = 's', long = "stackgen-env")]
    pub environment: Option<String>,

    /// Print the comparison as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompareTagsArgs {
    /// Repository as `owner/repo` or a GitHub URL.
    pub repo: String,
    pub from_tag: String,
    pub to_tag: String,

    #[arg(long)]
    pub no_commits: bool,

    #[arg(long)]
    pub no_files: bool,

    /// Show patch previews for changed files.
    #[arg(short, long)]
    pub details: bool,

    #[arg(long, conflicts_with = "messages")]
    pub json: bool,

    /// Print only the raw commit messages.
    #[arg(long)]
    pub messages: bool,
}

#[derive(Debug, Args)]
pub struct TrackerArgs {
    /// Linear API key.
    #[arg(long, env = "LINEAR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Skip the Linear lookups.
    #[arg(long)]
    pub no_fetch_details: bool,
}

#[derive(Debug, Args)]
pub struct TicketsArgs {
    /// Repository as `owner/repo` or a GitHub URL.
    pub repo: String,
    pub from_tag: String,
    pub to_tag: String,

    /// Write the report to this file instead of the console.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Ticket key pattern; matched inside square brackets.
    #[arg(long)]
    pub pattern: Option<String>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

#[derive(Debug, Args)]
#[command(group = clap::ArgGroup::new("env_source").required(true).args(["env_url", "env_file"]))]
pub struct GenerateInputArgs {
    /// Deployed version.json to take current tags from.
    #[arg(long)]
    pub version_url: Option<String>,

    /// URL of the .env with the new tags.
    #[arg(long)]
    pub env_url: Option<String>,

    /// Local .env with the new tags. Wins over --env-url.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    pub output: PathBuf,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,

    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ProcessAllArgs {
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    #[arg(short, long, default_value = DEFAULT_BATCH_OUTPUT)]
    pub output: PathBuf,

    /// Also process services whose tags did not change.
    #[arg(long)]
    pub include_unchanged: bool,

    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

#[derive(Debug, Args)]
pub struct RepoBatchArgs {
    /// File with one `owner/repo:from:to` or `owner/repo from to` per line.
    /// Reads stdin when neither this nor --interactive is given.
    #[arg(short, long, conflicts_with = "interactive")]
    pub input: Option<PathBuf>,

    /// Prompt for requests one at a time.
    #[arg(long)]
    pub interactive: bool,

    /// Summary file (default: timestamped name).
    #[arg(short, long)]
    pub summary: Option<PathBuf>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

#[derive(Debug, Args)]
pub struct LinearCheckArgs {
    #[arg(long, env = "LINEAR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Also fetch this ticket (e.g. `ENG-1234`).
    #[arg(long)]
    pub ticket: Option<String>,
}
