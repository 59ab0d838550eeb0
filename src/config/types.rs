//! Configuration defaults and value checks.

// Default value functions for serde
pub(crate) fn default_platform_domain() -> String {
    "pantheonsite.io".to_string()
}
pub(crate) fn default_http_timeout_secs() -> u64 {
    30
}
pub(crate) fn default_channel_timeout_secs() -> u64 {
    120
}
pub(crate) fn default_terminus_command() -> String {
    "terminus".to_string()
}
pub(crate) fn default_readiness_schema() -> String {
    "pantheon".to_string()
}
pub(crate) fn default_readiness_tables() -> Vec<String> {
    vec!["watchdog".to_string(), "wp_users".to_string()]
}
pub(crate) fn default_true() -> bool {
    true
}

/// Whether `name` is safe to splice into the readiness query.
pub fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
