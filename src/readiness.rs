//! Provisioning check for an environment's data store.
//!
//! A freshly created or freshly cloned environment answers HTTP long before
//! its database is fully imported. Claiming it in that state hands someone a
//! broken environment, so selection only considers environments whose data
//! store already contains a late-created sentinel table.
//!
//! Unlike lock reads, readiness checks fail closed: anything other than a
//! clean, exact answer is [`Readiness::Unknown`], which counts as not ready.

use crate::channel::PushChannel;
use tracing::debug;

/// Result of a readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Exactly one sentinel table exists.
    Ready,
    /// The query ran and the sentinel count was not one.
    NotReady,
    /// The query could not be run or its answer could not be read.
    Unknown(String),
}

impl Readiness {
    /// Only a definite `Ready` is ready.
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Anything that can tell whether an environment is provisioned.
pub trait ReadinessCheck {
    fn check(&self, env: &str) -> Readiness;

    fn is_ready(&self, env: &str) -> bool {
        self.check(env).is_ready()
    }
}

/// Check that counts sentinel tables in the data store's catalog.
///
/// The default sentinels (`watchdog` for Drupal, `wp_users` for WordPress)
/// sort near the end of each framework's table list, so they are among the
/// last to appear during an import. A healthy site has exactly one of them.
pub struct DataStoreReadiness<'a, P: PushChannel + ?Sized> {
    push: &'a P,
    query: String,
}

impl<'a, P: PushChannel + ?Sized> DataStoreReadiness<'a, P> {
    pub fn new(push: &'a P, schema: &str, tables: &[String]) -> Self {
        Self {
            push,
            query: sentinel_query(schema, tables),
        }
    }
}

/// Build the sentinel count query.
///
/// Names are validated as plain identifiers by config loading.
pub fn sentinel_query(schema: &str, tables: &[String]) -> String {
    let names = tables
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT COUNT(*) FROM information_schema.TABLES WHERE TABLE_SCHEMA='{}' AND TABLE_NAME IN ({});",
        schema, names
    )
}

impl<P: PushChannel + ?Sized> ReadinessCheck for DataStoreReadiness<'_, P> {
    fn check(&self, env: &str) -> Readiness {
        let readiness = match self.push.run_query(env, &self.query) {
            Err(e) => Readiness::Unknown(e.to_string()),
            Ok(output) if !output.succeeded() => Readiness::Unknown(output.diagnostic()),
            Ok(output) => match output.last_line.trim().parse::<u64>() {
                Ok(1) => Readiness::Ready,
                Ok(_) => Readiness::NotReady,
                Err(_) => Readiness::Unknown(format!(
                    "unexpected query result '{}'",
                    output.last_line
                )),
            },
        };
        debug!(env, ?readiness, "readiness check");
        readiness
    }
}
