//! CLI argument parsing for dibs.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Dibs: advisory claims on shared remote environments.
///
/// A claim is a small `__dibs.json` record uploaded to an environment's public
/// files directory. Anyone can read it over HTTP; claiming and releasing go
/// over sftp. Claims are advisory: nothing stops a deploy to a claimed
/// environment.
#[derive(Parser, Debug)]
#[command(name = "dibs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file to use instead of the per-user one.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for dibs.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Call dibs on one environment.
    ///
    /// Fails if anyone, including you, already has dibs on it.
    Claim(ClaimArgs),

    /// Call dibs on the first free, ready environment of a site.
    ///
    /// Environments are tried oldest first. `live` is skipped unless
    /// `--filter` asks for it.
    ClaimAny(ClaimAnyArgs),

    /// Release dibs on one environment.
    ///
    /// Removes the record without checking who wrote it.
    Release(SiteEnvArgs),

    /// Show who, if anyone, has dibs on one environment.
    Status(SiteEnvArgs),

    /// List a site's environments with their dibs status.
    Report(ReportArgs),
}

/// Arguments for the `claim` command.
#[derive(Parser, Debug)]
pub struct ClaimArgs {
    /// Environment in the format `site-name.env`.
    pub site_env: String,

    /// Note left with the claim.
    pub message: String,
}

/// Arguments for the `claim-any` command.
#[derive(Parser, Debug)]
pub struct ClaimAnyArgs {
    /// Site name.
    pub site: String,

    /// Note left with the claim.
    pub message: String,

    /// Only consider environments whose name matches this regex.
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for commands that act on one environment.
#[derive(Parser, Debug)]
pub struct SiteEnvArgs {
    /// Environment in the format `site-name.env`.
    pub site_env: String,
}

/// Arguments for the `report` command.
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Site name.
    pub site: String,

    /// Only report environments whose name matches this regex.
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only list claims older than this many seconds (0 lists everything).
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub older_than: u64,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
