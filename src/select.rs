//! Choosing an environment to claim from a site's pool.

use crate::catalog::EnvironmentEntry;
use crate::error::{DibsError, Result};
use crate::locks::LockBackend;
use crate::readiness::ReadinessCheck;
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

/// Environment that is never offered unless a filter asks for it.
pub const PROTECTED_ENV: &str = "live";

/// Which environment ids a command is willing to consider.
#[derive(Debug, Clone, Default)]
pub enum EnvFilter {
    /// Everything except `live`.
    #[default]
    AllButLive,
    /// Ids the pattern matches anywhere (unanchored, case as supplied).
    Pattern(Regex),
}

impl EnvFilter {
    /// Compile a caller-supplied pattern.
    pub fn parse(pattern: &str) -> Result<Self> {
        Regex::new(pattern).map(EnvFilter::Pattern).map_err(|e| {
            DibsError::ValidationError(format!("invalid filter pattern '{}': {}", pattern, e))
        })
    }

    /// Compile `pattern`, or use the default when none is given.
    pub fn from_option(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            Some(p) => Self::parse(p),
            None => Ok(Self::default()),
        }
    }

    pub fn matches(&self, env: &str) -> bool {
        match self {
            EnvFilter::AllButLive => env != PROTECTED_ENV,
            EnvFilter::Pattern(re) => re.is_match(env),
        }
    }

    /// The ids of `pool` that pass the filter, in pool order.
    pub fn apply<'p>(&'p self, pool: &'p [String]) -> impl Iterator<Item = &'p String> + 'p {
        pool.iter().filter(move |env| self.matches(env))
    }
}

impl fmt::Display for EnvFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvFilter::AllButLive => write!(f, "all but {}", PROTECTED_ENV),
            EnvFilter::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Turn catalog entries into the pool scan order: oldest first.
///
/// When every entry carries a creation time the pool is sorted by it
/// (stable, so ties keep catalog order). When any entry lacks one, catalog
/// order is trusted as-is.
pub fn order_pool(mut entries: Vec<EnvironmentEntry>) -> Vec<String> {
    if entries.iter().all(|e| e.created.is_some()) {
        entries.sort_by_key(|e| e.created);
    } else if !entries.is_empty() {
        warn!("catalog did not report creation times for every environment; using catalog order");
    }
    entries.into_iter().map(|e| e.id).collect()
}

/// Pick the first environment, in pool order, that passes `filter`, has no
/// dibs, and is ready.
///
/// Readiness is only checked for environments without a dibs.
pub fn select_candidate<L, R>(
    pool: &[String],
    filter: &EnvFilter,
    locks: &L,
    readiness: &R,
) -> Option<String>
where
    L: LockBackend + ?Sized,
    R: ReadinessCheck + ?Sized,
{
    for env in filter.apply(pool) {
        if let Some(record) = locks.read(env).record() {
            debug!(env = %env, owner = %record.owner, "skipping: dibs already called");
            continue;
        }
        if !readiness.is_ready(env) {
            debug!(env = %env, "skipping: not ready");
            continue;
        }
        return Some(env.clone());
    }
    None
}
