//! Per-invocation options.

use crate::error::{DibsError, Result};
use std::fmt;

/// A `site.env` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEnv {
    pub site: String,
    pub env: String,
}

impl SiteEnv {
    /// Parse `site-name.env`.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().split_once('.') {
            Some((site, env)) if !site.is_empty() && !env.is_empty() && !env.contains('.') => {
                Ok(Self {
                    site: site.to_string(),
                    env: env.to_string(),
                })
            }
            _ => Err(DibsError::ValidationError(format!(
                "'{}' is not a site environment. Use the format `site-name.env`.",
                value
            ))),
        }
    }
}

impl fmt::Display for SiteEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.site, self.env)
    }
}

/// What a command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One named environment.
    Env(SiteEnv),
    /// Any environment of `site` whose id passes `filter` (default: all but live).
    Site {
        site: String,
        filter: Option<String>,
    },
}

/// Everything one invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DibsOptions {
    pub target: Target,
    /// Note left with a claim. Default: none.
    pub message: Option<String>,
    /// Report only claims older than this many seconds; 0 reports everything.
    /// Default: 0.
    pub age_threshold_secs: u64,
}

impl DibsOptions {
    /// Options targeting one `site.env`.
    pub fn for_env(site_env: &str) -> Result<Self> {
        Ok(Self {
            target: Target::Env(SiteEnv::parse(site_env)?),
            message: None,
            age_threshold_secs: 0,
        })
    }

    /// Options targeting a site's pool.
    pub fn for_site(site: &str, filter: Option<&str>) -> Result<Self> {
        let site = site.trim();
        if site.is_empty() {
            return Err(DibsError::ValidationError("a site name is required".to_string()));
        }
        Ok(Self {
            target: Target::Site {
                site: site.to_string(),
                filter: filter.map(str::to_string),
            },
            message: None,
            age_threshold_secs: 0,
        })
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_age_threshold(mut self, secs: u64) -> Self {
        self.age_threshold_secs = secs;
        self
    }
}
