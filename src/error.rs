//! Error types for the dibs CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Failed reads of a lock record are not errors: they are folded into
//! [`crate::locks::LockRead::Absent`] by the lock store.

use crate::exit_codes;
use crate::locks::LockRecord;
use thiserror::Error;

/// Main error type for dibs operations.
#[derive(Error, Debug)]
pub enum DibsError {
    /// Missing or malformed input, or no environment could be resolved.
    #[error("{0}")]
    ValidationError(String),

    /// The environment already carries a valid dibs record.
    #[error(
        "{} already called dibs on {env} on {}: {}",
        holder_label(.existing, .yours),
        .existing.claimed_at_display(),
        .existing.message_text()
    )]
    Conflict {
        /// The environment that was targeted.
        env: String,
        /// The record found on the environment, unchanged.
        existing: LockRecord,
        /// Whether the existing record was written by the caller's identity.
        yours: bool,
    },

    /// A push-channel upload, remove, or local staging step failed.
    #[error("there was a problem {operation} {env}. Last message: {last_output}")]
    TransportError {
        /// What was being attempted (e.g. "calling dibs on").
        operation: String,
        /// The environment being operated on.
        env: String,
        /// Last line of channel output, for diagnostics.
        last_output: String,
    },

    /// The site/environment catalog could not answer.
    #[error("catalog lookup failed: {0}")]
    CatalogError(String),

    /// Configuration file could not be read or is invalid.
    #[error("{0}")]
    ConfigError(String),
}

fn holder_label(existing: &LockRecord, yours: &bool) -> String {
    if *yours {
        "You".to_string()
    } else {
        existing.owner.clone()
    }
}

impl DibsError {
    /// Returns the process exit code for this error.
    ///
    /// Every handled failure exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DibsError::ValidationError(_)
            | DibsError::Conflict { .. }
            | DibsError::TransportError { .. }
            | DibsError::CatalogError(_)
            | DibsError::ConfigError(_) => exit_codes::FAILURE,
        }
    }

    /// Build a transport error for a failed claim upload.
    pub fn claim_failed(env: &str, last_output: impl Into<String>) -> Self {
        DibsError::TransportError {
            operation: "calling dibs on".to_string(),
            env: env.to_string(),
            last_output: last_output.into(),
        }
    }

    /// Build a transport error for a failed release.
    pub fn release_failed(env: &str, last_output: impl Into<String>) -> Self {
        DibsError::TransportError {
            operation: "releasing dibs on".to_string(),
            env: env.to_string(),
            last_output: last_output.into(),
        }
    }
}

/// Result type alias for dibs operations.
pub type Result<T> = std::result::Result<T, DibsError>;
