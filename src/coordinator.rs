//! The dibs protocol: claim, release, and inspect one environment.
//!
//! ```text
//!   Unlocked --acquire--> Locked
//!   Locked   --release--> Unlocked
//!   Locked   --acquire--> Conflict error, record untouched
//! ```
//!
//! `acquire` reads, then writes. Two claimants that read "absent" at the same
//! time will both write, the later upload replaces the earlier one, and the
//! earlier claimant is not told. The read-before-write check catches the
//! common, human-paced case only.

use crate::error::{DibsError, Result};
use crate::locks::{LockBackend, LockRecord};
use tracing::info;

/// Lock state of one environment as the protocol sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    Unlocked,
    Locked(LockRecord),
}

/// Runs the protocol against a [`LockBackend`].
pub struct LockCoordinator<'a, B: LockBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: LockBackend + ?Sized> LockCoordinator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Call dibs on `env` for `owner`.
    ///
    /// Fails with [`DibsError::Conflict`] when a record for `env` is already
    /// present, carrying that record unchanged. Returns `env` on success.
    pub fn acquire(&self, env: &str, owner: &str, message: Option<&str>) -> Result<String> {
        if let LockStatus::Locked(existing) = self.status(env) {
            let yours = existing.owner == owner;
            return Err(DibsError::Conflict {
                env: env.to_string(),
                existing,
                yours,
            });
        }

        let record = LockRecord::new(owner, env, message);
        self.backend.write(env, &record)?;
        info!(env, owner, "called dibs");
        Ok(env.to_string())
    }

    /// Remove whatever record `env` has. Does not look first.
    pub fn release(&self, env: &str) -> Result<String> {
        self.backend.delete(env)?;
        info!(env, "released dibs");
        Ok(env.to_string())
    }

    /// Current lock state of `env`. Unreadable records read as unlocked.
    pub fn status(&self, env: &str) -> LockStatus {
        match self.backend.read(env).record() {
            Some(record) if record.is_for(env) => LockStatus::Locked(record.clone()),
            _ => LockStatus::Unlocked,
        }
    }
}
