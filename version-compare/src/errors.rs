use std::path::PathBuf;

use thiserror::Error;

pub type ManifestResult<T> = Result<T, ManifestError>;

/// Failures reading the release manifest (the intermediate JSON file).
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("input file '{path}' could not be read: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Covers malformed JSON and a top-level value that is not an array.
    #[error("invalid JSON in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The deployed `version.json` body did not parse, so current tags are unknown.
    #[error("deployed version manifest is not JSON; refusing to build releases on default tags")]
    DeployedNotJson,
}
