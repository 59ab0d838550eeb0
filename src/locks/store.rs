//! Transport and serialization for dibs records.

use super::LockBackend;
use super::record::{DIBS_FILE_NAME, LockRecord, remote_record_path};
use crate::catalog::SiteInfo;
use crate::channel::{FetchOutcome, PullChannel, PushChannel};
use crate::error::{DibsError, Result};
use std::fmt;
use tracing::{debug, info};

/// Result of reading an environment's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockRead {
    /// A record that claims this environment.
    Present(LockRecord),
    /// No usable record. Treated as "no dibs" whatever the reason.
    Absent(AbsentReason),
}

impl LockRead {
    /// The record, if one claims the environment.
    pub fn record(&self) -> Option<&LockRecord> {
        match self {
            LockRead::Present(record) => Some(record),
            LockRead::Absent(_) => None,
        }
    }

    #[cfg(test)]
    pub fn is_locked(&self) -> bool {
        self.record().is_some()
    }
}

/// Why a read came back absent. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentReason {
    /// The pull channel failed (timeout, connect error, non-200, empty body).
    Unreachable(String),
    /// The body was not a dibs record.
    Malformed(String),
    /// The record was written for another environment and copied here.
    ForeignTarget(String),
}

impl fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsentReason::Unreachable(why) => write!(f, "unreachable: {}", why),
            AbsentReason::Malformed(why) => write!(f, "malformed record: {}", why),
            AbsentReason::ForeignTarget(target) => {
                write!(f, "record was written for '{}'", target)
            }
        }
    }
}

/// Where an environment's public files are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEndpoint {
    /// Site machine name.
    pub site_name: String,
    /// Platform domain environments are served under (e.g. `pantheonsite.io`).
    pub domain: String,
    /// Slash-prefixed public files path for the site's framework.
    pub public_path: String,
}

impl PublicEndpoint {
    pub fn new(site: &SiteInfo, domain: &str) -> Self {
        Self {
            site_name: site.name.clone(),
            domain: domain.to_string(),
            public_path: site.framework.public_files_path().to_string(),
        }
    }

    /// URL of `env`'s record, with a cache-busting query parameter.
    pub fn record_url(&self, env: &str, cache_buster: u32) -> String {
        format!(
            "http://{}-{}.{}{}/{}?cb={}",
            env, self.site_name, self.domain, self.public_path, DIBS_FILE_NAME, cache_buster
        )
    }
}

/// Reads records over the pull channel; writes and deletes over the push
/// channel.
pub struct LockStore<'a, P: PushChannel + ?Sized, H: PullChannel + ?Sized> {
    push: &'a P,
    pull: &'a H,
    endpoint: PublicEndpoint,
}

impl<'a, P: PushChannel + ?Sized, H: PullChannel + ?Sized> LockStore<'a, P, H> {
    pub fn new(push: &'a P, pull: &'a H, endpoint: PublicEndpoint) -> Self {
        Self {
            push,
            pull,
            endpoint,
        }
    }
}

/// Interpret a fetched body as `env`'s record.
pub(crate) fn parse_fetched(env: &str, body: &str) -> LockRead {
    match LockRecord::from_json(body) {
        Ok(record) if record.is_for(env) => LockRead::Present(record),
        Ok(record) => LockRead::Absent(AbsentReason::ForeignTarget(record.target)),
        Err(e) => LockRead::Absent(AbsentReason::Malformed(e.to_string())),
    }
}

impl<P: PushChannel + ?Sized, H: PullChannel + ?Sized> LockBackend for LockStore<'_, P, H> {
    fn read(&self, env: &str) -> LockRead {
        let url = self.endpoint.record_url(env, rand::random::<u32>());
        let read = match self.pull.fetch(&url) {
            FetchOutcome::Body(body) => parse_fetched(env, &body),
            FetchOutcome::Unavailable(why) => LockRead::Absent(AbsentReason::Unreachable(why)),
        };
        if let LockRead::Absent(reason) = &read {
            debug!(env, %reason, "no dibs record");
        }
        read
    }

    fn write(&self, env: &str, record: &LockRecord) -> Result<()> {
        // Dropped (and removed) on every return path below.
        let staging = tempfile::Builder::new()
            .prefix("dibs-")
            .tempdir()
            .map_err(|e| {
                DibsError::claim_failed(
                    env,
                    format!("could not create local staging directory: {}", e),
                )
            })?;
        let local_path = staging.path().join(DIBS_FILE_NAME);

        let json = record.to_json().map_err(|e| {
            DibsError::claim_failed(env, format!("could not serialize dibs record: {}", e))
        })?;
        std::fs::write(&local_path, json).map_err(|e| {
            DibsError::claim_failed(env, format!("could not stage {}: {}", DIBS_FILE_NAME, e))
        })?;

        let output = self
            .push
            .upload(env, &local_path, &remote_record_path())
            .map_err(|e| DibsError::claim_failed(env, e.to_string()))?;
        if !output.succeeded() {
            return Err(DibsError::claim_failed(env, output.diagnostic()));
        }
        info!(env, owner = %record.owner, "dibs record uploaded");
        Ok(())
    }

    fn delete(&self, env: &str) -> Result<()> {
        let output = self
            .push
            .remove(env, &remote_record_path())
            .map_err(|e| DibsError::release_failed(env, e.to_string()))?;
        if !output.succeeded() {
            return Err(DibsError::release_failed(env, output.diagnostic()));
        }
        info!(env, "dibs record removed");
        Ok(())
    }
}
