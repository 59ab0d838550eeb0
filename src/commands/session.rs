//! Wiring the collaborators one site's commands share.

use crate::catalog::{ConnectionCache, SiteCatalog, SiteInfo, TerminusCatalog};
use crate::channel::{HttpPullChannel, SftpChannel};
use crate::config::Config;
use crate::coordinator::LockCoordinator;
use crate::error::{DibsError, Result};
use crate::locks::{LockBackend, LockStore, PublicEndpoint};
use crate::readiness::{DataStoreReadiness, ReadinessCheck};
use crate::select::order_pool;
use tracing::debug;

/// Everything a command needs to act on one site.
pub(crate) struct SiteSession<'a> {
    pub site: &'a SiteInfo,
    pub catalog: &'a dyn SiteCatalog,
    pub locks: &'a dyn LockBackend,
    pub readiness: &'a dyn ReadinessCheck,
}

impl<'a> SiteSession<'a> {
    /// The site's environments, oldest first.
    pub fn pool(&self) -> Result<Vec<String>> {
        Ok(order_pool(self.catalog.environments(&self.site.name)?))
    }

    /// Fail unless `env` is one of the site's environments.
    pub fn require_env(&self, env: &str) -> Result<()> {
        if self.pool()?.iter().any(|id| id == env) {
            Ok(())
        } else {
            Err(DibsError::ValidationError(format!(
                "site '{}' has no environment named '{}'",
                self.site.name, env
            )))
        }
    }

    pub fn coordinator(&self) -> LockCoordinator<'a, dyn LockBackend + 'a> {
        LockCoordinator::new(self.locks)
    }
}

/// Build the production collaborators for `site` and run `f` against them.
///
/// Connection details fetched while `f` runs are cached for its duration only.
pub(crate) fn with_site<T, F>(config: &Config, site: &str, f: F) -> Result<T>
where
    F: FnOnce(&SiteSession<'_>) -> Result<T>,
{
    let timeout = config.channel_timeout();
    let catalog = TerminusCatalog::new(&config.terminus_command, timeout)?;
    let info = catalog.site(site)?;
    debug!(site = %info.name, framework = ?info.framework, "resolved site");

    let connections = ConnectionCache::new();
    let push = SftpChannel::new(&catalog, &info.name, &connections, timeout);
    let pull = HttpPullChannel::new(config.http_timeout(), config.accept_invalid_certs)?;
    let store = LockStore::new(
        &push,
        &pull,
        PublicEndpoint::new(&info, &config.platform_domain),
    );
    let readiness =
        DataStoreReadiness::new(&push, &config.readiness_schema, &config.readiness_tables);

    let session = SiteSession {
        site: &info,
        catalog: &catalog,
        locks: &store,
        readiness: &readiness,
    };
    let result = f(&session);
    debug!(cached = connections.len(), "connection lookups this run");
    result
}
