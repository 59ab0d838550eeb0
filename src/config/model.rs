//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Tool-wide configuration, read from `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Platform
    // =========================================================================
    /// Domain environment hostnames live under: `{env}-{site}.{domain}`.
    #[serde(default = "default_platform_domain")]
    pub platform_domain: String,

    /// Command line used to invoke the platform CLI.
    #[serde(default = "default_terminus_command")]
    pub terminus_command: String,

    // =========================================================================
    // Transport
    // =========================================================================
    /// Seconds before a dibs read over HTTP is abandoned (and reads as absent).
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Seconds before an sftp, mysql, or terminus command is killed.
    #[serde(default = "default_channel_timeout_secs")]
    pub channel_timeout_secs: u64,

    /// Accept self-signed and wildcard certificates when reading records.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    // =========================================================================
    // Readiness
    // =========================================================================
    /// Data-store schema the sentinel tables are looked up in.
    #[serde(default = "default_readiness_schema")]
    pub readiness_schema: String,

    /// Sentinel tables; exactly one must exist for an environment to be ready.
    #[serde(default = "default_readiness_tables")]
    pub readiness_tables: Vec<String>,

    // =========================================================================
    // Claims
    // =========================================================================
    /// Identity written as the claimant. Defaults to the login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    /// Filter used when a command is given none. Unset means "all but live".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform_domain: default_platform_domain(),
            terminus_command: default_terminus_command(),
            http_timeout_secs: default_http_timeout_secs(),
            channel_timeout_secs: default_channel_timeout_secs(),
            accept_invalid_certs: default_true(),
            readiness_schema: default_readiness_schema(),
            readiness_tables: default_readiness_tables(),
            identity: None,
            default_filter: None,
        }
    }
}
