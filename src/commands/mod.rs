//! Command implementations for dibs.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command resolves its site through the catalog, wires
//! the push and pull channels into a lock store, and prints a one-line result
//! (or a table, for `report`) on stdout.

mod claim;
mod claim_any;
mod release;
mod report;
mod session;
mod status;


use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Claim(args) => claim::cmd_claim(config, args),
        Command::ClaimAny(args) => claim_any::cmd_claim_any(config, args),
        Command::Release(args) => release::cmd_release(config, args),
        Command::Status(args) => status::cmd_status(config, args),
        Command::Report(args) => report::cmd_report(config, args),
    }
}
