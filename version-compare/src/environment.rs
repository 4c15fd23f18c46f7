//! Predefined deployment environments.

use std::fmt;

/// Domain the environment hosts live under unless overridden.
pub const DEFAULT_DOMAIN: &str = "stackgen.com";

/// Known environments. The host prefix is what goes in front of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Production,
    Staging,
    Development,
    Demo,
}

impl Environment {
    /// Menu order.
    pub const ALL: [Environment; 4] = [
        Environment::Production,
        Environment::Staging,
        Environment::Development,
        Environment::Demo,
    ];

    pub fn host(self) -> &'static str {
        match self {
            Environment::Production => "cloud",
            Environment::Staging => "stage.dev",
            Environment::Development => "main.dev",
            Environment::Demo => "demo.cloud",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Environment::Production => "Production",
            Environment::Staging => "Staging",
            Environment::Development => "Development",
            Environment::Demo => "Demo",
        }
    }

    /// Finds the environment whose host prefix is `host`.
    pub fn from_host(host: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.host() == host)
    }

    /// Host prefixes of all known environments, in menu order.
    pub fn hosts() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Environment::host)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.host())
    }
}

/// `true` when `host` is one of the predefined prefixes.
pub fn is_known(host: &str) -> bool {
    Environment::from_host(host).is_some()
}

/// `https://{host}.{domain}/version.json`. `host` may be any prefix, known or not.
pub fn version_url(host: &str, domain: &str) -> String {
    format!("https://{host}.{domain}/version.json")
}
