//! Static name mapping between `.env` keys and deployed service names.
//!
//! `.env` files name services after their variables (`stack_exporter`),
//! while `version.json` uses the deployed service name (`exporter`). The
//! table below is hand-maintained; `None` marks services that are known to
//! have no deployed counterpart.

/// One `.env` key → deployed name (or `None`).
pub type MappingEntry = (&'static str, Option<&'static str>);

/// Read-only mapping table. Keys are unique.
#[derive(Debug, Clone, Copy)]
pub struct ServiceNameMapping {
    entries: &'static [MappingEntry],
    deployed_only: &'static [&'static str],
}

/// Built-in table for the platform services.
pub const SERVICE_NAME_MAPPING: ServiceNameMapping = ServiceNameMapping {
    entries: &[
        // core services
        ("appcd", Some("appcd")),
        ("iacgen", Some("iac-gen")),
        ("appcdui", Some("ui")),
        ("stack_exporter", Some("exporter")),
        ("stackgen_vault", Some("vault")),
        ("integrations", Some("integrations")),
        ("backstage_adapter", Some("backstage-adapter")),
        ("infra_catalog_tracker", Some("infra-catalog-tracker")),
        ("deployment_manager", Some("deployment-manager")),
        ("stackgen_notifications", Some("notifications")),
        ("tf_module_service", Some("tf-module-service")),
        ("audit_manager", Some("audit-manager")),
        ("sgai_orchestration", Some("sgai-orchestration")),
        // present in .env, never reported by version.json
        ("appcd_analyzer", None),
        ("appcdvira", None),
        ("llm_gateway", None),
        ("sgai_knowledge", None),
        ("sgai_control", None),
        ("community_infra_gen", None),
        ("stackgen_subagents", None),
    ],
    deployed_only: &[
        "agent-intent-to-iac",
        "agent-iac-filler",
        "agent-iac-exporter",
        "agent-iac-explainer",
        "agent-iam-fix",
    ],
};

/// What the table says about an `.env` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingLookup {
    /// The key has no entry at all.
    Unknown,
    /// The key is known to have no deployed counterpart.
    NoDeployedEquivalent,
    /// The key maps to this deployed name.
    Deployed(&'static str),
}

impl ServiceNameMapping {
    /// Builds a custom table (tests, alternative platforms).
    pub const fn new(
        entries: &'static [MappingEntry],
        deployed_only: &'static [&'static str],
    ) -> Self {
        Self {
            entries,
            deployed_only,
        }
    }

    /// Looks up an `.env` key (case-insensitive).
    pub fn lookup(&self, env_name: &str) -> MappingLookup {
        let env_name = env_name.to_lowercase();
        match self.entries.iter().find(|(k, _)| *k == env_name) {
            None => MappingLookup::Unknown,
            Some((_, None)) => MappingLookup::NoDeployedEquivalent,
            Some((_, Some(deployed))) => MappingLookup::Deployed(deployed),
        }
    }

    /// Deployed name for an `.env` key, if it has one.
    pub fn deployed_name_for(&self, env_name: &str) -> Option<&'static str> {
        match self.lookup(env_name) {
            MappingLookup::Deployed(name) => Some(name),
            _ => None,
        }
    }

    /// All `.env` keys the table knows about.
    pub fn known_env_services(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Deployed services that are expected to have no `.env` entry.
    pub fn deployed_only_services(&self) -> &'static [&'static str] {
        self.deployed_only
    }

    pub fn entries(&self) -> &'static [MappingEntry] {
        self.entries
    }
}

impl Default for ServiceNameMapping {
    fn default() -> Self {
        SERVICE_NAME_MAPPING
    }
}
