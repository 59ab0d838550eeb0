//! Transport capabilities used by the dibs protocol.
//!
//! Two channels reach a remote environment:
//!
//! - **Push**: upload and remove files inside the environment's private
//!   filesystem and run data-store queries. Authenticated; see [`sftp`].
//! - **Pull**: anonymous HTTP GET of one public file; see [`http`].
//!
//! Both are traits so the protocol can run against an in-memory remote in
//! tests.

pub mod http;
pub mod process;
pub mod sftp;

use crate::error::Result;
use std::path::Path;

pub use http::HttpPullChannel;
pub use sftp::SftpChannel;

/// Outcome of one push-channel command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOutput {
    /// Exit code of the remote command (None if it was killed or never ran).
    pub exit_code: Option<i32>,
    /// Last non-empty line of output. For queries, the scalar result.
    pub last_line: String,
    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl ChannelOutput {
    /// A command that exited 0.
    pub fn success(last_line: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            last_line: last_line.into(),
            timed_out: false,
        }
    }

    /// A command that exited with a non-zero status or never started.
    pub fn failure(exit_code: Option<i32>, last_line: impl Into<String>) -> Self {
        Self {
            exit_code,
            last_line: last_line.into(),
            timed_out: false,
        }
    }

    /// A command that was killed for running past its timeout.
    pub fn timeout(last_line: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            last_line: last_line.into(),
            timed_out: true,
        }
    }

    /// Timeouts count as failures.
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Text to show an operator when the command failed.
    pub fn diagnostic(&self) -> String {
        if self.timed_out {
            return "timed out waiting for the remote command".to_string();
        }
        if !self.last_line.is_empty() {
            return self.last_line.clone();
        }
        match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "remote command did not exit normally".to_string(),
        }
    }
}

/// Result of fetching a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200 with a non-empty body.
    Body(String),
    /// Anything else: timeout, connect failure, non-200 status, empty body.
    Unavailable(String),
}

/// Authenticated access to an environment's private filesystem and data store.
///
/// An `Err` means the command could not be issued at all (for example the
/// environment's connection details could not be resolved). A command that ran
/// and failed is an `Ok` with a failing [`ChannelOutput`].
pub trait PushChannel {
    /// Upload `local_path` to `remote_path`, relative to the landing directory.
    fn upload(&self, env: &str, local_path: &Path, remote_path: &str) -> Result<ChannelOutput>;

    /// Remove `remote_path`, relative to the landing directory.
    fn remove(&self, env: &str, remote_path: &str) -> Result<ChannelOutput>;

    /// Run `sql` against the environment's data store; the scalar result is
    /// the output's `last_line`.
    fn run_query(&self, env: &str, sql: &str) -> Result<ChannelOutput>;
}

/// Anonymous read access to public URLs.
pub trait PullChannel {
    /// Fetch `url`. Never fails; failures are [`FetchOutcome::Unavailable`].
    fn fetch(&self, url: &str) -> FetchOutcome;
}
