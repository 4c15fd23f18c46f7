//! Version parsing and reconciliation.
//!
//! Reads service versions from a repository `.env` file and from a deployed
//! `version.json` manifest, aligns the two naming conventions through a static
//! mapping table and reports which services match, differ, or exist on one
//! side only. Also owns the environment catalogue and the release manifest
//! that drives batch ticket extraction.

pub mod deployed_parser;
pub mod env_parser;
pub mod environment;
pub mod errors;
pub mod reconcile;
pub mod release_manifest;
pub mod report;
pub mod service_mapping;

use indexmap::IndexMap;

/// Insertion-ordered service key → version string.
pub type VersionMap = IndexMap<String, String>;

pub use deployed_parser::{DeployedVersions, parse_deployed, parse_deployed_json};
pub use env_parser::{parse_env, parse_env_assignments};
pub use environment::{DEFAULT_DOMAIN, Environment};
pub use errors::{ManifestError, ManifestResult};
pub use reconcile::{
    Classification, ComparisonReport, UnifiedComparisonRecord, compare_versions, reconcile,
};
pub use release_manifest::{
    ServiceRelease, generate_releases, generate_releases_from_deployed, load_releases,
};
pub use service_mapping::{MappingLookup, SERVICE_NAME_MAPPING, ServiceNameMapping};
