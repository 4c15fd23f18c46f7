//! Environment helpers shared by the provider configs.

/// Reads an optional, non-empty environment variable (trimmed).
pub fn env_opt(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// First non-empty variable among `names`, in order.
pub fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env_opt(name))
}

/// `true` when `value` starts with `http://` or `https://`.
pub fn is_http_endpoint(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_need_an_http_scheme() {
        assert!(is_http_endpoint("https://api.github.com"));
        assert!(is_http_endpoint("http://127.0.0.1:8080"));
        assert!(!is_http_endpoint("api.github.com"));
    }

    #[test]
    fn unset_variables_are_none() {
        assert_eq!(env_opt("RELEASE_DIFF_TEST_SURELY_UNSET_VAR"), None);
        assert_eq!(
            first_env(&["RELEASE_DIFF_TEST_UNSET_A", "RELEASE_DIFF_TEST_UNSET_B"]),
            None
        );
    }
}
