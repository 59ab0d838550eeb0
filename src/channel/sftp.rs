//! Push channel over the platform's sftp and mysql commands.
//!
//! The platform hands out a ready-made `sftp ...` command line per
//! environment. File operations are sent to it as a short script on stdin,
//! starting in the landing directory; the public files live under `files/`.
//! sftp runs in batch mode (`-b -`), so the first failing command aborts the
//! session with a non-zero exit. Removing a record that is not there fails.
//! Queries run through the environment's `mysql ...` command line with `-e`.

use super::process::{ProcessOutput, run_with_timeout, split_command};
use super::{ChannelOutput, PushChannel};
use crate::catalog::{ConnectionCache, ConnectionInfo, SiteCatalog};
use crate::error::Result;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Inserted after the sftp program name: read the script from stdin and stop
/// at the first failing command.
const SFTP_BATCH_ARGS: [&str; 2] = ["-b", "-"];

/// [`PushChannel`] that drives sftp and mysql subprocesses.
pub struct SftpChannel<'a, C: SiteCatalog + ?Sized> {
    catalog: &'a C,
    site: String,
    connections: &'a ConnectionCache,
    timeout: Duration,
}

impl<'a, C: SiteCatalog + ?Sized> SftpChannel<'a, C> {
    pub fn new(
        catalog: &'a C,
        site: &str,
        connections: &'a ConnectionCache,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            site: site.to_string(),
            connections,
            timeout,
        }
    }

    fn connection(&self, env: &str) -> Result<ConnectionInfo> {
        self.connections
            .get_or_fetch(env, || self.catalog.connection_info(&self.site, env))
    }

    fn run_sftp(&self, env: &str, script: &str) -> Result<ChannelOutput> {
        let info = self.connection(env)?;
        debug!(env, script = %script.trim_end().replace('\n', "; "), "running sftp");
        Ok(run(
            sftp_argv(&info.sftp_command),
            &[],
            Some(script),
            self.timeout,
        ))
    }
}

impl<C: SiteCatalog + ?Sized> PushChannel for SftpChannel<'_, C> {
    fn upload(&self, env: &str, local_path: &Path, remote_path: &str) -> Result<ChannelOutput> {
        let script = upload_script(local_path, remote_path);
        self.run_sftp(env, &script)
    }

    fn remove(&self, env: &str, remote_path: &str) -> Result<ChannelOutput> {
        let script = remove_script(remote_path);
        self.run_sftp(env, &script)
    }

    fn run_query(&self, env: &str, sql: &str) -> Result<ChannelOutput> {
        let info = self.connection(env)?;
        debug!(env, sql, "running query");
        Ok(run(
            split_command(&info.mysql_command),
            &["-e", sql],
            None,
            self.timeout,
        ))
    }
}

/// The platform's sftp command line with batch mode switched on.
fn sftp_argv(command_line: &str) -> io::Result<Vec<String>> {
    let mut argv = split_command(command_line)?;
    argv.splice(1..1, SFTP_BATCH_ARGS.iter().map(|arg| arg.to_string()));
    Ok(argv)
}

/// Run a parsed command line, folding every failure into a [`ChannelOutput`].
fn run(
    argv: io::Result<Vec<String>>,
    extra_args: &[&str],
    stdin: Option<&str>,
    timeout: Duration,
) -> ChannelOutput {
    let argv = match argv {
        Ok(argv) => argv,
        Err(e) => return ChannelOutput::failure(None, e.to_string()),
    };
    match run_with_timeout(&argv, extra_args, stdin, timeout) {
        Ok(output) => to_channel_output(&output),
        Err(e) => ChannelOutput::failure(None, e.to_string()),
    }
}

fn to_channel_output(output: &ProcessOutput) -> ChannelOutput {
    let last_line = output.last_line();
    if output.timed_out {
        ChannelOutput::timeout(last_line)
    } else if output.is_success() {
        ChannelOutput::success(last_line)
    } else {
        ChannelOutput::failure(output.exit_code, last_line)
    }
}

/// Split `files/__dibs.json` into (`Some("files")`, `"__dibs.json"`).
fn split_remote(remote_path: &str) -> (Option<&str>, &str) {
    match remote_path.rsplit_once('/') {
        Some((dir, name)) if !dir.is_empty() => (Some(dir), name),
        Some((_, name)) => (None, name),
        None => (None, remote_path),
    }
}

fn quote(arg: &str) -> String {
    format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
}

fn upload_script(local_path: &Path, remote_path: &str) -> String {
    let (dir, name) = split_remote(remote_path);
    let mut script = String::new();
    if let Some(dir) = dir {
        script.push_str(&format!("cd {}\n", quote(dir)));
    }
    script.push_str(&format!(
        "put {} {}\n",
        quote(&local_path.to_string_lossy()),
        quote(name)
    ));
    script
}

fn remove_script(remote_path: &str) -> String {
    let (dir, name) = split_remote(remote_path);
    let mut script = String::new();
    if let Some(dir) = dir {
        script.push_str(&format!("cd {}\n", quote(dir)));
    }
    script.push_str(&format!("rm {}\n", quote(name)));
    script
}
