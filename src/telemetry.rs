//! Logging bootstrap for the binary.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Targets that `-v` turns up to debug.
pub const WORKSPACE_TARGETS: [&str; 5] = [
    "release_diff",
    "remote_fetch",
    "version_compare",
    "git_compare_engine",
    "ticket_tracker",
];

const DEFAULT_FILTER: &str = "warn";

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// `RUST_LOG` or `warn`, plus debug for the workspace crates when verbose.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if !verbose {
        return base;
    }
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|target| Directive::from_str(&format!("{target}=debug")).ok())
        .fold(base, EnvFilter::add_directive)
}

/// Installs the global subscriber. Logs go to stderr; reports own stdout.
pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_target(verbose)
        .with_ansi(io::stderr().is_terminal())
        .compact();

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_filter_mentions_every_workspace_crate() {
        let rendered = env_filter(true).to_string();
        for target in WORKSPACE_TARGETS {
            assert!(rendered.contains(&format!("{target}=debug")), "{rendered}");
        }
    }
}
