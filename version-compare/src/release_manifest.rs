//! Release manifest: which tag each service is on and which tag it moves to.
//!
//! The manifest is a JSON array of [`ServiceRelease`] written by
//! `generate-input` and consumed by the batch ticket processor.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::VersionMap;
use crate::deployed_parser::DeployedVersions;
use crate::errors::{ManifestError, ManifestResult};

/// Tag assumed deployed when `version.json` has no entry for a service.
pub const DEFAULT_CURRENT_TAG: &str = "v1.0.0";

/// One catalogued service: deployed name, `.env` variable and repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub service: &'static str,
    pub version_key: &'static str,
    pub repository: &'static str,
}

const fn entry(
    service: &'static str,
    version_key: &'static str,
    repository: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        service,
        version_key,
        repository,
    }
}

/// Services tracked by the manifest generator, in output order.
pub const RELEASE_CATALOG: &[CatalogEntry] = &[
    entry("ui", "APPCDUI_VERSION", "https://github.com/appcd-dev/appcd-ui"),
    entry("appcd", "APPCD_VERSION", "https://github.com/appcd-dev/appcd"),
    entry("iac-gen", "IACGEN_VERSION", "https://github.com/appcd-dev/iac-gen"),
    entry(
        "exporter",
        "STACK_EXPORTER_VERSION",
        "https://github.com/appcd-dev/stack-exporter",
    ),
    entry(
        "vault",
        "STACKGEN_VAULT_VERSION",
        "https://github.com/appcd-dev/stackgen-vault",
    ),
    entry(
        "integrations",
        "INTEGRATIONS_VERSION",
        "https://github.com/appcd-dev/integrations",
    ),
    entry(
        "backstage-adapter",
        "BACKSTAGE_ADAPTER_VERSION",
        "https://github.com/appcd-dev/backstage-adapter",
    ),
    entry(
        "infra-catalog-tracker",
        "INFRA_CATALOG_TRACKER_VERSION",
        "https://github.com/appcd-dev/infra-catalog-tracker",
    ),
    entry(
        "sgai-orchestration",
        "SGAI_ORCHESTRATION",
        "https://github.com/appcd-dev/sgai-orchestration",
    ),
    entry(
        "deployment-manager",
        "DEPLOYMENT_MANAGER_VERSION",
        "https://github.com/appcd-dev/deployment-manager",
    ),
    entry(
        "notifications",
        "STACKGEN_NOTIFICATION",
        "https://github.com/appcd-dev/stackgen-notification",
    ),
    entry(
        "tf-module-service",
        "TF_MODULE_SERVICE_VERSION",
        "https://github.com/appcd-dev/tf-module-service",
    ),
    entry(
        "audit-manager",
        "AUDIT_MANAGER_VERSION",
        "https://github.com/appcd-dev/audit-manager",
    ),
    entry("aiden", "AIDEN_VERSION", "https://github.com/appcd-dev/aiden"),
    entry(
        "aiden-ui",
        "AIDEN_UI_VERSION",
        "https://github.com/appcd-dev/aiden-ui-v2",
    ),
];

/// Manifest entry. Missing fields read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRelease {
    pub service: String,
    pub repository: String,
    pub version_key: String,
    pub current_tag: String,
    pub new_tag: String,
}

impl ServiceRelease {
    /// Both tags are set and differ.
    pub fn has_change(&self) -> bool {
        !self.current_tag.is_empty() && !self.new_tag.is_empty() && self.current_tag != self.new_tag
    }
}

/// Builds manifest entries from deployed versions (keyed by service name)
/// and raw `.env` assignments (keyed by exact variable name).
pub fn generate_releases(
    deployed: &VersionMap,
    env_vars: &IndexMap<String, String>,
) -> Vec<ServiceRelease> {
    generate_from_catalog(RELEASE_CATALOG, deployed, env_vars)
}

/// Like [`generate_releases`], but refuses a deployed body that was not JSON.
pub fn generate_releases_from_deployed(
    deployed: &DeployedVersions,
    env_vars: &IndexMap<String, String>,
) -> ManifestResult<Vec<ServiceRelease>> {
    match deployed {
        DeployedVersions::Structured(map) => Ok(generate_releases(map, env_vars)),
        DeployedVersions::PlainText(_) => Err(ManifestError::DeployedNotJson),
    }
}

pub fn generate_from_catalog(
    catalog: &[CatalogEntry],
    deployed: &VersionMap,
    env_vars: &IndexMap<String, String>,
) -> Vec<ServiceRelease> {
    let releases: Vec<ServiceRelease> = catalog
        .iter()
        .filter_map(|entry| {
            let current_tag = deployed
                .get(entry.service)
                .map(String::as_str)
                .unwrap_or(DEFAULT_CURRENT_TAG);
            let new_tag = env_vars
                .get(entry.version_key)
                .map(String::as_str)
                .unwrap_or_default();

            if current_tag.is_empty() && new_tag.is_empty() {
                debug!(service = entry.service, "no version on either side, skipped");
                return None;
            }

            Some(ServiceRelease {
                service: entry.service.to_string(),
                repository: entry.repository.to_string(),
                version_key: entry.version_key.to_string(),
                current_tag: current_tag.to_string(),
                new_tag: new_tag.to_string(),
            })
        })
        .collect();

    info!(count = releases.len(), "release manifest generated");
    releases
}

/// Reads a manifest file. The top-level value must be an array.
pub fn load_releases(path: &Path) -> ManifestResult<Vec<ServiceRelease>> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_releases(&text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_releases(text: &str) -> serde_json::Result<Vec<ServiceRelease>> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn catalog_services_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for e in RELEASE_CATALOG {
            assert!(seen.insert(e.service), "duplicate {}", e.service);
        }
        assert_eq!(RELEASE_CATALOG.len(), 15);
    }

    #[test]
    fn tags_come_from_both_sides_with_defaults() {
        let deployed = map(&[("ui", "v0.17.2"), ("appcd", "v0.65.4")]);
        let env = map(&[("APPCDUI_VERSION", "v0.17.3"), ("APPCD_VERSION", "v0.65.4")]);

        let releases = generate_releases(&deployed, &env);
        assert_eq!(releases.len(), RELEASE_CATALOG.len());

        assert_eq!(
            releases[0],
            ServiceRelease {
                service: "ui".into(),
                repository: "https://github.com/appcd-dev/appcd-ui".into(),
                version_key: "APPCDUI_VERSION".into(),
                current_tag: "v0.17.2".into(),
                new_tag: "v0.17.3".into(),
            }
        );
        assert!(releases[0].has_change());
        assert!(!releases[1].has_change());

        let vault = releases.iter().find(|r| r.service == "vault").unwrap();
        assert_eq!(vault.current_tag, DEFAULT_CURRENT_TAG);
        assert_eq!(vault.new_tag, "");
    }

    #[test]
    fn entries_with_no_version_anywhere_are_dropped() {
        let catalog = [entry("ghost", "GHOST_VERSION", "https://github.com/o/ghost")];
        let releases = generate_from_catalog(&catalog, &map(&[("ghost", "")]), &map(&[]));
        assert!(releases.is_empty());
    }

    #[test]
    fn manifest_files_load_and_reject_non_arrays() {
        let mut ok = tempfile::NamedTempFile::new().unwrap();
        write!(
            ok,
            r#"[{{"service":"ui","repository":"https://github.com/o/ui","current_tag":"v1"}}]"#
        )
        .unwrap();
        let releases = load_releases(ok.path()).unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].new_tag, "");
        assert_eq!(releases[0].version_key, "");

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"service":"ui"}}"#).unwrap();
        assert!(matches!(
            load_releases(bad.path()),
            Err(ManifestError::Parse { .. })
        ));

        assert!(matches!(
            load_releases(Path::new("/definitely/not/here.json")),
            Err(ManifestError::Read { .. })
        ));
    }

    #[test]
    fn plain_text_deployed_body_builds_nothing() {
        let deployed = crate::parse_deployed("<html>Service Unavailable</html>");
        let env = map(&[("APPCDUI_VERSION", "v2.0.0")]);
        assert!(matches!(
            generate_releases_from_deployed(&deployed, &env),
            Err(ManifestError::DeployedNotJson)
        ));

        let deployed = crate::parse_deployed(r#"{"ui": "v1.5.0"}"#);
        let releases = generate_releases_from_deployed(&deployed, &env).unwrap();
        assert!(releases.iter().any(|r| r.current_tag == "v1.5.0"));
    }
}
