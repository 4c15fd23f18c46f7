//! `release-diff`: version drift and release ticket tooling.

mod cli;
mod commands;
mod output;
mod progress;
mod prompt;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use git_compare_engine::{GitCompareConfigError, GitCompareError};
use remote_fetch::FetchError;
use ticket_tracker::{TrackerConfigError, TrackerError};
use tracing::{debug, warn};
use version_compare::ManifestError;

use crate::cli::Cli;

/// How a failure is labelled on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Configuration,
    Api,
    Other,
}

impl FailureKind {
    fn label(self) -> &'static str {
        match self {
            FailureKind::Configuration => "Configuration error",
            FailureKind::Api => "API error",
            FailureKind::Other => "Error",
        }
    }
}

fn classify(err: &anyhow::Error) -> FailureKind {
    for cause in err.chain() {
        if cause.is::<GitCompareConfigError>()
            || cause.is::<TrackerConfigError>()
            || cause.is::<ManifestError>()
        {
            return FailureKind::Configuration;
        }
        if let Some(e) = cause.downcast_ref::<GitCompareError>() {
            return match e {
                GitCompareError::Config(_) => FailureKind::Configuration,
                GitCompareError::Fetch(_) => FailureKind::Api,
                GitCompareError::Validation(_) => FailureKind::Other,
            };
        }
        if cause.is::<FetchError>() || cause.is::<TrackerError>() {
            return FailureKind::Api;
        }
    }
    FailureKind::Other
}

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), ".env loaded"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to load .env"),
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to start runtime: {e}").red());
            return ExitCode::FAILURE;
        }
    };

    let code = rt.block_on(async {
        tokio::select! {
            res = commands::run(cli) => match res {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    let kind = classify(&e);
                    eprintln!("{}", format!("{}: {e:#}", kind.label()).red());
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Operation cancelled by user.".yellow());
                ExitCode::SUCCESS
            }
        }
    });

    // A prompt may still be blocked on stdin.
    rt.shutdown_background();
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn failures_are_labelled_by_origin() {
        let cfg = anyhow::Error::from(GitCompareError::from(GitCompareConfigError::MissingToken));
        assert_eq!(classify(&cfg), FailureKind::Configuration);

        let key = anyhow::Error::from(TrackerConfigError::MissingApiKey).context("setting up");
        assert_eq!(classify(&key), FailureKind::Configuration);

        let http = Err::<(), _>(FetchError::from_status(404, None))
            .context("failed to fetch https://stage.dev.stackgen.com/version.json")
            .unwrap_err();
        assert_eq!(classify(&http), FailureKind::Api);

        let gql = anyhow::Error::from(TrackerError::Api("bad".into()));
        assert_eq!(classify(&gql), FailureKind::Api);

        let html = Err::<(), _>(ManifestError::DeployedNotJson)
            .context("unusable response from https://stage.dev.stackgen.com/version.json")
            .unwrap_err();
        assert_eq!(classify(&html), FailureKind::Configuration);

        let other = anyhow::anyhow!("no environment selected");
        assert_eq!(classify(&other), FailureKind::Other);
        assert_eq!(FailureKind::Api.label(), "API error");
    }
}
