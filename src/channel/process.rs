//! Subprocess execution with timeout and output capture.
//!
//! Every remote command dibs issues (sftp, mysql, terminus) is a local
//! subprocess. Output is captured to anonymous temp files so a chatty child
//! cannot block on a full pipe while we poll it for exit.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Captured result of a subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code of the process (None if killed or terminated by signal).
    pub exit_code: Option<i32>,
    /// Everything written to stdout.
    pub stdout: String,
    /// Everything written to stderr.
    pub stderr: String,
    /// Whether the process was killed due to timeout.
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Check if the process exited cleanly with status 0.
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Last non-empty line of stdout, falling back to stderr.
    pub fn last_line(&self) -> String {
        last_non_empty_line(&self.stdout)
            .or_else(|| last_non_empty_line(&self.stderr))
            .unwrap_or_default()
    }
}

fn last_non_empty_line(text: &str) -> Option<String> {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Split a platform-provided command line (e.g. an sftp or mysql invocation)
/// into argv.
pub fn split_command(command_line: &str) -> io::Result<Vec<String>> {
    let args = shell_words::split(command_line).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("failed to parse command '{}': {}", command_line, e),
        )
    })?;
    if args.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "command is empty after parsing",
        ));
    }
    Ok(args)
}

/// Run `argv` plus `extra_args`, optionally feeding `stdin`, and wait at most
/// `timeout` for it to exit.
///
/// An `Err` means the process could not be started or observed. A process
/// that ran and failed, or was killed on timeout, is an `Ok`.
pub fn run_with_timeout(
    argv: &[String],
    extra_args: &[&str],
    stdin: Option<&str>,
    timeout: Duration,
) -> io::Result<ProcessOutput> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

    let mut stdout_file = tempfile::tempfile()?;
    let mut stderr_file = tempfile::tempfile()?;

    let mut command = Command::new(program);
    command
        .args(args)
        .args(extra_args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?));

    let mut child = command.spawn().map_err(|e| {
        io::Error::new(e.kind(), format!("failed to execute '{}': {}", program, e))
    })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // The child may exit before reading everything (e.g. a failed login),
        // which surfaces as a broken pipe; its exit status tells the story.
        if let Err(e) = pipe.write_all(input.as_bytes())
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            kill_process(&mut child);
            return Err(e);
        }
    }

    let (exit_code, timed_out) = wait_with_timeout(&mut child, timeout)?;

    Ok(ProcessOutput {
        exit_code,
        stdout: read_back(&mut stdout_file)?,
        stderr: read_back(&mut stderr_file)?,
        timed_out,
    })
}

/// Wait for a child process with timeout.
///
/// Returns (exit_code, timed_out).
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<(Option<i32>, bool)> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait()? {
            Some(status) => return Ok((status.code(), false)),
            None => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok((None, true));
                }
                std::thread::sleep(poll_interval);
            }
        }
    }
}

/// Kill a process and reap it.
fn kill_process(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn read_back(file: &mut std::fs::File) -> io::Result<String> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
