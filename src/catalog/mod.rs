//! Site and environment directory.
//!
//! dibs does not talk to the hosting platform's API itself. Listing a site's
//! environments, learning its framework, and fetching per-environment
//! connection commands are delegated to a [`SiteCatalog`]; the production
//! implementation shells out to the platform CLI ([`TerminusCatalog`]).

mod terminus;

pub use terminus::TerminusCatalog;

use crate::error::Result;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;

/// Application framework of a site; decides where public files are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framework {
    /// WordPress (single site or network).
    WordPress,
    /// Drupal and everything else.
    #[default]
    Drupal,
}

impl Framework {
    /// Map the catalog's framework name.
    pub fn from_catalog(name: &str) -> Self {
        match name {
            "wordpress" | "wordpress_network" => Framework::WordPress,
            _ => Framework::Drupal,
        }
    }

    /// Slash-prefixed URL path of the public files directory.
    pub fn public_files_path(&self) -> &'static str {
        match self {
            Framework::WordPress => "/wp-content/uploads",
            Framework::Drupal => "/sites/default/files",
        }
    }
}

/// What the catalog knows about a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteInfo {
    /// Machine name of the site, used in environment hostnames.
    pub name: String,
    /// Application framework.
    pub framework: Framework,
}

/// One environment of a site as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    /// Environment id (e.g. `dev`, `test`, `pr-42`).
    pub id: String,
    /// Creation time in unix seconds, when the catalog reports one.
    pub created: Option<i64>,
}

impl EnvironmentEntry {
    #[cfg(test)]
    pub fn new(id: &str, created: Option<i64>) -> Self {
        Self {
            id: id.to_string(),
            created,
        }
    }
}

/// Commands for reaching one environment over the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionInfo {
    /// Full sftp invocation, e.g. `sftp -o Port=2222 dev.<uuid>@appserver...`.
    pub sftp_command: String,
    /// Full mysql invocation including credentials and database.
    pub mysql_command: String,
}

/// Site directory collaborator.
pub trait SiteCatalog {
    /// Look up a site by name or id.
    fn site(&self, site: &str) -> Result<SiteInfo>;

    /// List the site's environments in catalog order.
    fn environments(&self, site: &str) -> Result<Vec<EnvironmentEntry>>;

    /// Fetch connection commands for one environment.
    fn connection_info(&self, site: &str, env: &str) -> Result<ConnectionInfo>;
}

/// Connection details already fetched during this invocation, keyed by
/// environment id.
///
/// Owned by the command that creates it and lent to the push channel, so the
/// lookup happens at most once per environment per run.
#[derive(Debug, Default)]
pub struct ConnectionCache {
    entries: RefCell<HashMap<String, ConnectionInfo>>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `env`, calling `fetch` on a miss.
    ///
    /// Failed lookups are not cached.
    pub fn get_or_fetch<F>(&self, env: &str, fetch: F) -> Result<ConnectionInfo>
    where
        F: FnOnce() -> Result<ConnectionInfo>,
    {
        if let Some(info) = self.entries.borrow().get(env) {
            return Ok(info.clone());
        }
        let info = fetch()?;
        self.entries
            .borrow_mut()
            .insert(env.to_string(), info.clone());
        Ok(info)
    }

    /// Number of environments cached so far.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
