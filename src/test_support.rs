//! In-memory remote used by unit tests.
//!
//! [`FakeRemote`] stands in for both channels of a single site: uploads land
//! in a map keyed by environment, and the pull channel serves them back from
//! URLs built the same way the real endpoint builds them.

use crate::catalog::{ConnectionInfo, EnvironmentEntry, Framework, SiteCatalog, SiteInfo};
use crate::channel::{ChannelOutput, FetchOutcome, PullChannel, PushChannel};
use crate::error::{DibsError, Result};
use crate::locks::{LockRecord, PublicEndpoint};
use crate::readiness::{Readiness, ReadinessCheck};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub(crate) const SITE: &str = "acme";
pub(crate) const DOMAIN: &str = "example.test";

/// How the fake sftp answers `rm` of a file that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MissingFilePolicy {
    /// Exit 0, like a transport that treats removing a missing file as done.
    Succeed,
    /// Exit 1 with "No such file", like `SftpChannel` in batch mode.
    Fail,
}

pub(crate) fn site() -> SiteInfo {
    SiteInfo {
        name: SITE.to_string(),
        framework: Framework::Drupal,
    }
}

pub(crate) fn endpoint() -> PublicEndpoint {
    PublicEndpoint::new(&site(), DOMAIN)
}

pub(crate) struct FakeRemote {
    files: RefCell<HashMap<String, String>>,
    missing_file_policy: MissingFilePolicy,
    push_broken: RefCell<HashSet<String>>,
    pull_broken: RefCell<HashSet<String>>,
    query_results: RefCell<HashMap<String, ChannelOutput>>,
    pub(crate) uploads: Cell<usize>,
    pub(crate) fetched_urls: RefCell<Vec<String>>,
    pub(crate) staging_paths: RefCell<Vec<PathBuf>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::with_policy(MissingFilePolicy::Fail)
    }

    pub(crate) fn with_policy(missing_file_policy: MissingFilePolicy) -> Self {
        Self {
            files: RefCell::new(HashMap::new()),
            missing_file_policy,
            push_broken: RefCell::new(HashSet::new()),
            pull_broken: RefCell::new(HashSet::new()),
            query_results: RefCell::new(HashMap::new()),
            uploads: Cell::new(0),
            fetched_urls: RefCell::new(Vec::new()),
            staging_paths: RefCell::new(Vec::new()),
        }
    }

    /// Place a record on `env` directly, as another client would.
    pub(crate) fn put_record(&self, env: &str, record: &LockRecord) {
        self.put_raw(env, &record.to_json().unwrap());
    }

    /// Place arbitrary bytes in `env`'s record file.
    pub(crate) fn put_raw(&self, env: &str, body: &str) {
        self.files
            .borrow_mut()
            .insert(env.to_string(), body.to_string());
    }

    pub(crate) fn raw(&self, env: &str) -> Option<String> {
        self.files.borrow().get(env).cloned()
    }

    /// Make uploads and removes on `env` fail.
    pub(crate) fn break_push(&self, env: &str) {
        self.push_broken.borrow_mut().insert(env.to_string());
    }

    /// Make reads of `env` time out.
    pub(crate) fn break_pull(&self, env: &str) {
        self.pull_broken.borrow_mut().insert(env.to_string());
    }

    /// Answer data-store queries on `env` with `output`.
    pub(crate) fn set_query_result(&self, env: &str, output: ChannelOutput) {
        self.query_results
            .borrow_mut()
            .insert(env.to_string(), output);
    }

    /// Recover the environment id from a record URL.
    fn env_from_url(url: &str) -> Option<String> {
        let host = url.strip_prefix("http://")?.split('/').next()?;
        let label = host.split('.').next()?;
        label
            .strip_suffix(&format!("-{}", SITE))
            .map(str::to_string)
    }
}

impl PushChannel for FakeRemote {
    fn upload(&self, env: &str, local_path: &Path, _remote_path: &str) -> Result<ChannelOutput> {
        self.staging_paths
            .borrow_mut()
            .push(local_path.to_path_buf());
        if self.push_broken.borrow().contains(env) {
            return Ok(ChannelOutput::failure(Some(1), "Permission denied (publickey)."));
        }
        let body = match std::fs::read_to_string(local_path) {
            Ok(body) => body,
            Err(e) => return Ok(ChannelOutput::failure(Some(1), e.to_string())),
        };
        self.uploads.set(self.uploads.get() + 1);
        self.put_raw(env, &body);
        Ok(ChannelOutput::success("sftp> put __dibs.json"))
    }

    fn remove(&self, env: &str, _remote_path: &str) -> Result<ChannelOutput> {
        if self.push_broken.borrow().contains(env) {
            return Ok(ChannelOutput::failure(Some(1), "Permission denied (publickey)."));
        }
        let existed = self.files.borrow_mut().remove(env).is_some();
        match (existed, self.missing_file_policy) {
            (true, _) | (false, MissingFilePolicy::Succeed) => {
                Ok(ChannelOutput::success("sftp> rm __dibs.json"))
            }
            (false, MissingFilePolicy::Fail) => Ok(ChannelOutput::failure(
                Some(1),
                "Couldn't delete file: No such file or directory",
            )),
        }
    }

    fn run_query(&self, env: &str, _sql: &str) -> Result<ChannelOutput> {
        Ok(self
            .query_results
            .borrow()
            .get(env)
            .cloned()
            .unwrap_or_else(|| ChannelOutput::failure(Some(1), "ERROR 2003: Can't connect")))
    }
}

impl PullChannel for FakeRemote {
    fn fetch(&self, url: &str) -> FetchOutcome {
        self.fetched_urls.borrow_mut().push(url.to_string());
        let Some(env) = Self::env_from_url(url) else {
            return FetchOutcome::Unavailable("unknown host".to_string());
        };
        if self.pull_broken.borrow().contains(&env) {
            return FetchOutcome::Unavailable("operation timed out".to_string());
        }
        match self.files.borrow().get(&env) {
            Some(body) if !body.trim().is_empty() => FetchOutcome::Body(body.clone()),
            Some(_) => FetchOutcome::Unavailable("empty response body".to_string()),
            None => FetchOutcome::Unavailable("HTTP status 404 Not Found".to_string()),
        }
    }
}

/// Readiness answers fixed per environment; unknown environments are not ready.
pub(crate) struct FakeReadiness {
    answers: HashMap<String, Readiness>,
    pub(crate) checked: RefCell<Vec<String>>,
}

impl FakeReadiness {
    pub(crate) fn ready(envs: &[&str]) -> Self {
        Self {
            answers: envs
                .iter()
                .map(|e| (e.to_string(), Readiness::Ready))
                .collect(),
            checked: RefCell::new(Vec::new()),
        }
    }
}

impl ReadinessCheck for FakeReadiness {
    fn check(&self, env: &str) -> Readiness {
        self.checked.borrow_mut().push(env.to_string());
        self.answers
            .get(env)
            .cloned()
            .unwrap_or(Readiness::NotReady)
    }
}

/// A record for `target` claimed `age_secs` ago.
pub(crate) fn record_aged(owner: &str, target: &str, message: &str, age_secs: i64) -> LockRecord {
    LockRecord {
        owner: owner.to_string(),
        claimed_at: chrono::Utc::now().timestamp() - age_secs,
        target: target.to_string(),
        message: Some(message.to_string()),
    }
}

pub(crate) fn pool(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Catalog for [`SITE`] listing fixed environments, oldest first.
pub(crate) struct FakeCatalog {
    envs: Vec<String>,
}

impl FakeCatalog {
    pub(crate) fn new(envs: &[&str]) -> Self {
        Self { envs: pool(envs) }
    }
}

impl SiteCatalog for FakeCatalog {
    fn site(&self, name: &str) -> Result<SiteInfo> {
        if name == SITE {
            Ok(site())
        } else {
            Err(DibsError::CatalogError(format!("site '{}' not found", name)))
        }
    }

    fn environments(&self, name: &str) -> Result<Vec<EnvironmentEntry>> {
        self.site(name)?;
        Ok(self
            .envs
            .iter()
            .enumerate()
            .map(|(i, id)| EnvironmentEntry::new(id, Some(1_600_000_000 + i as i64)))
            .collect())
    }

    fn connection_info(&self, name: &str, env: &str) -> Result<ConnectionInfo> {
        self.site(name)?;
        Ok(ConnectionInfo {
            sftp_command: format!("sftp {}.{}@appserver", env, name),
            mysql_command: format!("mysql -h dbserver.{}.{}", env, name),
        })
    }
}
