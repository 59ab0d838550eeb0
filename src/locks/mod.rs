//! Advisory dibs records for remote environments.
//!
//! A dibs is a single JSON file, `__dibs.json`, living in the public files
//! directory of the environment it claims. It is written and removed over the
//! push channel and read back anonymously over the pull channel.
//!
//! # Record Format
//!
//! - `by`: who called dibs (the claimant's local identity)
//! - `at`: unix seconds (UTC) when the record was written
//! - `for`: the environment id the record was written for
//! - `message`: optional free-text note
//!
//! # Read Semantics
//!
//! Reads fail open. A timeout, a non-200 response, an empty or malformed body,
//! and a record whose `for` names another environment (left behind when one
//! environment's files are cloned into another) all read as "no dibs". Callers
//! cannot tell "nobody called dibs" apart from "could not check".
//!
//! # No Atomicity
//!
//! Nothing on the remote side arbitrates between two writers. A claim is a
//! read followed by a write, and two claimants that both read "absent" will
//! both write; the last upload wins and the other claimant is never told.

mod record;
mod store;

#[cfg(test)]
mod tests;

pub use record::LockRecord;
pub(crate) use record::format_claim_time;
pub use store::{LockRead, LockStore, PublicEndpoint};

use crate::error::Result;

/// Read/write/delete access to the dibs record of one environment at a time.
///
/// [`LockStore`] is the production implementation. A transport that offers a
/// conditional create could implement `write` as create-if-absent without the
/// rest of the protocol changing.
pub trait LockBackend {
    /// Read the current record. Never fails; failures read as absent.
    fn read(&self, env: &str) -> LockRead;

    /// Replace the record on `env` with `record`.
    fn write(&self, env: &str, record: &LockRecord) -> Result<()>;

    /// Remove the record from `env`.
    fn delete(&self, env: &str) -> Result<()>;
}
