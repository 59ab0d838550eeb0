//! Point-in-time dibs status across a site's pool.

use crate::locks::{LockBackend, format_claim_time};
use crate::readiness::ReadinessCheck;
use crate::select::EnvFilter;
use chrono::{DateTime, Utc};
use std::fmt;

/// Status column of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    /// No dibs and provisioned.
    Available,
    /// No dibs, but the data store is not (known to be) provisioned.
    NotReady,
    /// Someone has dibs.
    AlreadyCalled,
}

impl EnvStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvStatus::Available => "Available",
            EnvStatus::NotReady => "Not Ready",
            EnvStatus::AlreadyCalled => "Already called",
        }
    }
}

impl fmt::Display for EnvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub env: String,
    pub status: EnvStatus,
    pub owner: Option<String>,
    /// Unix seconds of the claim.
    pub claimed_at: Option<i64>,
    pub message: Option<String>,
}

impl ReportRow {
    /// Claim time for display; empty when there is no dibs.
    pub fn claimed_at_display(&self) -> String {
        self.claimed_at
            .and_then(|at| DateTime::from_timestamp(at, 0))
            .map(format_claim_time)
            .unwrap_or_default()
    }
}

/// Build the report for every environment of `pool` that passes `filter`.
///
/// With `age_threshold_secs == 0` every environment gets a row. Otherwise
/// only environments whose dibs is older than the threshold are listed, which
/// leaves out every environment without a dibs. Rows keep pool order.
pub fn report<L, R>(
    pool: &[String],
    filter: &EnvFilter,
    age_threshold_secs: u64,
    now: DateTime<Utc>,
    locks: &L,
    readiness: &R,
) -> Vec<ReportRow>
where
    L: LockBackend + ?Sized,
    R: ReadinessCheck + ?Sized,
{
    let threshold = i64::try_from(age_threshold_secs).unwrap_or(i64::MAX);
    let mut rows = Vec::new();

    for env in filter.apply(pool) {
        let read = locks.read(env);
        let record = read.record().filter(|r| r.is_for(env));

        let status = match record {
            Some(_) => EnvStatus::AlreadyCalled,
            None if readiness.is_ready(env) => EnvStatus::Available,
            None => EnvStatus::NotReady,
        };

        let age = record.map(|r| r.age_secs(now)).unwrap_or(0);
        if threshold != 0 && age <= threshold {
            continue;
        }

        rows.push(ReportRow {
            env: env.clone(),
            status,
            owner: record.map(|r| r.owner.clone()),
            claimed_at: record.map(|r| r.claimed_at),
            message: record.and_then(|r| r.message.clone()),
        });
    }

    rows
}
