//! The dibs record and its wire format.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Fixed name of the record file on every environment.
pub const DIBS_FILE_NAME: &str = "__dibs.json";

/// Directory, relative to the push channel's landing directory, that is
/// served publicly by the environment.
pub const REMOTE_FILES_DIR: &str = "files";

/// Remote path of the record, relative to the push channel's landing directory.
pub fn remote_record_path() -> String {
    format!("{}/{}", REMOTE_FILES_DIR, DIBS_FILE_NAME)
}

/// A dibs record as stored in `__dibs.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Identity of the claimant.
    #[serde(rename = "by")]
    pub owner: String,

    /// Unix seconds (UTC) at which the claim was written.
    #[serde(rename = "at")]
    pub claimed_at: i64,

    /// Environment id the claim was written for.
    #[serde(rename = "for")]
    pub target: String,

    /// Free-text note left by the claimant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LockRecord {
    /// Create a record for `target` stamped with the current time.
    pub fn new(owner: &str, target: &str, message: Option<&str>) -> Self {
        Self {
            owner: owner.to_string(),
            claimed_at: Utc::now().timestamp(),
            target: target.to_string(),
            message: message.map(str::to_string),
        }
    }

    /// Parse a record from the body of `__dibs.json`.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Serialize to the compact JSON written to the remote file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Whether this record actually claims `env`.
    ///
    /// A record copied along with an environment's files still names the
    /// environment it was written for, so it does not claim the copy.
    pub fn is_for(&self, env: &str) -> bool {
        self.target == env
    }

    /// Seconds elapsed between the claim and `now`.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.claimed_at
    }

    /// The claim time as a UTC datetime, if representable.
    pub fn claimed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claimed_at, 0)
    }

    /// Human-readable claim time, e.g. `Mon Jan 5th at 03:04pm`.
    pub fn claimed_at_display(&self) -> String {
        match self.claimed_at_utc() {
            Some(at) => format_claim_time(at),
            None => self.claimed_at.to_string(),
        }
    }

    /// The message, or an empty string when none was left.
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Format a claim time the way dibs messages show it.
pub(crate) fn format_claim_time(at: DateTime<Utc>) -> String {
    let day = at.day();
    format!(
        "{} {}{} at {}",
        at.format("%a %b"),
        day,
        ordinal_suffix(day),
        at.format("%I:%M%P")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
