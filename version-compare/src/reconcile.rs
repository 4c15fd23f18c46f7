//! Service version reconciliation.
//!
//! Aligns the `.env`-keyed and deployed-keyed version maps through a
//! [`ServiceNameMapping`] and classifies every service into one of four
//! buckets: matched, differing, env-only, deployed-only.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::VersionMap;
use crate::service_mapping::{MappingLookup, SERVICE_NAME_MAPPING, ServiceNameMapping};

/// One reconciled service. At least one of the versions is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedComparisonRecord {
    pub env_name: Option<String>,
    pub deployed_name: Option<String>,
    pub env_version: Option<String>,
    pub deployed_version: Option<String>,
}

/// Derived classification of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Matched,
    Differing,
    EnvOnly,
    DeployedOnly,
}

impl UnifiedComparisonRecord {
    pub fn classification(&self) -> Classification {
        match (&self.env_version, &self.deployed_version) {
            (None, _) => Classification::DeployedOnly,
            (Some(_), None) => Classification::EnvOnly,
            (Some(env), Some(deployed)) if env == deployed => Classification::Matched,
            (Some(_), Some(_)) => Classification::Differing,
        }
    }

    /// Display name: the `.env` name when there is one, else the deployed one.
    pub fn service(&self) -> &str {
        self.env_name
            .as_deref()
            .or(self.deployed_name.as_deref())
            .unwrap_or_default()
    }

    fn env_only(env_name: &str, env_version: &str, deployed_name: Option<&str>) -> Self {
        Self {
            env_name: Some(env_name.to_string()),
            deployed_name: deployed_name.map(str::to_string),
            env_version: Some(env_version.to_string()),
            deployed_version: None,
        }
    }
}

/// Reconciles both maps. Env records come first in `env_map` order, then
/// deployed-only records in `deployed_map` order.
pub fn reconcile(
    env_map: &VersionMap,
    deployed_map: &VersionMap,
    mapping: &ServiceNameMapping,
) -> Vec<UnifiedComparisonRecord> {
    let mut records = Vec::with_capacity(env_map.len() + deployed_map.len());
    let mut referenced: HashSet<&str> = HashSet::new();

    for (env_name, env_version) in env_map {
        match mapping.lookup(env_name) {
            MappingLookup::Unknown | MappingLookup::NoDeployedEquivalent => {
                records.push(UnifiedComparisonRecord::env_only(env_name, env_version, None));
            }
            MappingLookup::Deployed(deployed_name) => {
                referenced.insert(deployed_name);
                match deployed_map.get(deployed_name) {
                    Some(deployed_version) => records.push(UnifiedComparisonRecord {
                        env_name: Some(env_name.clone()),
                        deployed_name: Some(deployed_name.to_string()),
                        env_version: Some(env_version.clone()),
                        deployed_version: Some(deployed_version.clone()),
                    }),
                    None => records.push(UnifiedComparisonRecord::env_only(
                        env_name,
                        env_version,
                        Some(deployed_name),
                    )),
                }
            }
        }
    }

    for (deployed_name, deployed_version) in deployed_map {
        if referenced.contains(deployed_name.as_str()) {
            continue;
        }
        records.push(UnifiedComparisonRecord {
            env_name: None,
            deployed_name: Some(deployed_name.clone()),
            env_version: None,
            deployed_version: Some(deployed_version.clone()),
        });
    }

    debug!(
        env = env_map.len(),
        deployed = deployed_map.len(),
        records = records.len(),
        "reconciled version maps"
    );
    records
}

/// Records partitioned into the four buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    pub differences: Vec<UnifiedComparisonRecord>,
    pub matches: Vec<UnifiedComparisonRecord>,
    pub env_only: Vec<UnifiedComparisonRecord>,
    pub deployed_only: Vec<UnifiedComparisonRecord>,
}

impl ComparisonReport {
    /// Buckets records by [`UnifiedComparisonRecord::classification`],
    /// keeping their relative order.
    pub fn from_records(records: Vec<UnifiedComparisonRecord>) -> Self {
        let mut report = Self::default();
        for record in records {
            match record.classification() {
                Classification::Matched => report.matches.push(record),
                Classification::Differing => report.differences.push(record),
                Classification::EnvOnly => report.env_only.push(record),
                Classification::DeployedOnly => report.deployed_only.push(record),
            }
        }
        report
    }

    /// True when anything other than matches was found.
    pub fn has_differences(&self) -> bool {
        !self.differences.is_empty() || !self.env_only.is_empty() || !self.deployed_only.is_empty()
    }

    pub fn total(&self) -> usize {
        self.differences.len() + self.matches.len() + self.env_only.len() + self.deployed_only.len()
    }
}

/// Reconciles with the built-in table and buckets the result.
pub fn compare_versions(env_map: &VersionMap, deployed_map: &VersionMap) -> ComparisonReport {
    ComparisonReport::from_records(reconcile(env_map, deployed_map, &SERVICE_NAME_MAPPING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn map(pairs: &[(&str, &str)]) -> VersionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn differing_versions_produce_one_differing_record() {
        let mapping = ServiceNameMapping::new(&[("appcd", Some("appcd"))], &[]);
        let records = reconcile(
            &map(&[("appcd", "v0.65.4")]),
            &map(&[("appcd", "v2025.7.10")]),
            &mapping,
        );

        assert_eq!(
            records,
            vec![UnifiedComparisonRecord {
                env_name: Some("appcd".into()),
                deployed_name: Some("appcd".into()),
                env_version: Some("v0.65.4".into()),
                deployed_version: Some("v2025.7.10".into()),
            }]
        );
        assert_eq!(records[0].classification(), Classification::Differing);
    }

    #[test]
    fn explicit_none_mapping_is_env_only_regardless_of_deployed() {
        let mapping = ServiceNameMapping::new(&[("llm_gateway", None)], &[]);
        let env = map(&[("llm_gateway", "v0.6.3")]);

        for deployed in [map(&[]), map(&[("llm_gateway", "v0.6.3")])] {
            let report = ComparisonReport::from_records(reconcile(&env, &deployed, &mapping));
            assert_eq!(report.env_only.len(), 1);
            assert_eq!(report.env_only[0].env_version.as_deref(), Some("v0.6.3"));
            assert_eq!(report.env_only[0].deployed_name, None);
        }
    }

    #[test]
    fn unreferenced_deployed_key_is_deployed_only() {
        let mapping = ServiceNameMapping::new(&[("appcd", Some("appcd"))], &[]);
        let report = ComparisonReport::from_records(reconcile(
            &map(&[("appcd", "v1")]),
            &map(&[("appcd", "v1"), ("exporter", "v0.9.9")]),
            &mapping,
        ));

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.deployed_only.len(), 1);
        assert_eq!(report.deployed_only[0].deployed_name.as_deref(), Some("exporter"));
        assert_eq!(report.deployed_only[0].service(), "exporter");
        assert!(report.has_differences());
    }

    #[test]
    fn unknown_env_key_and_missing_deployed_value_are_env_only() {
        let report = compare_versions(
            &map(&[("brand_new", "v1"), ("stack_exporter", "v0.9.9")]),
            &map(&[]),
        );
        assert_eq!(report.env_only.len(), 2);
        assert_eq!(report.env_only[1].deployed_name.as_deref(), Some("exporter"));
        assert_eq!(report.env_only[1].deployed_version, None);
    }

    #[test]
    fn matching_maps_have_no_differences() {
        let report = compare_versions(
            &map(&[("appcdui", "v0.17.3"), ("iacgen", "v0.52.6")]),
            &map(&[("ui", "v0.17.3"), ("iac-gen", "v0.52.6")]),
        );
        assert_eq!(report.matches.len(), 2);
        assert!(!report.has_differences());
    }

    #[test]
    fn every_record_lands_in_exactly_one_bucket() {
        let env = map(&[
            ("appcd", "v0.65.4"),
            ("appcd_analyzer", "v0.30.0"),
            ("iacgen", "v0.52.6"),
            ("appcdui", "v0.17.3"),
            ("appcdvira", "main"),
            ("llm_gateway", "v0.6.3"),
            ("stack_exporter", "v0.9.9"),
            ("stackgen_vault", "v0.5.1"),
            ("backstage_adapter", "main"),
            ("deployment_manager", "v0.4.3"),
            ("stackgen_notifications", "main"),
            ("stackgen_subagents", "v0.0.17"),
            ("sgai_orchestration", "v0.0.6"),
        ]);
        let deployed = map(&[
            ("appcd", "v2025.7.10"),
            ("iac-gen", "v0.52.6"),
            ("ui", "v0.17.3"),
            ("exporter", "v0.9.9"),
            ("vault", "v0.5.1"),
            ("backstage-adapter", ""),
            ("agent-intent-to-iac", "v0.0.17"),
            ("agent-iam-fix", "v0.0.17"),
            ("sgai-orchestration", "v0.0.6"),
            ("deployment-manager", "v0.4.2"),
            ("notifications", "main"),
        ]);

        let records = reconcile(&env, &deployed, &SERVICE_NAME_MAPPING);
        let report = ComparisonReport::from_records(records.clone());
        assert_eq!(report.total(), records.len());

        let bucketed: BTreeSet<String> = report
            .differences
            .iter()
            .chain(&report.matches)
            .chain(&report.env_only)
            .chain(&report.deployed_only)
            .map(|r| r.service().to_string())
            .collect();
        let mut expected: BTreeSet<String> = env.keys().cloned().collect();
        expected.extend(["agent-intent-to-iac".to_string(), "agent-iam-fix".to_string()]);
        assert_eq!(bucketed, expected);

        let differing: Vec<&str> = report.differences.iter().map(|r| r.service()).collect();
        assert_eq!(differing, vec!["appcd", "backstage_adapter", "deployment_manager"]);
        assert_eq!(report.deployed_only.len(), 2);
        assert_eq!(report.env_only.len(), 4);
        assert_eq!(report.matches.len(), 6);
    }
}
