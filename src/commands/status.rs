//! Implementation of the `dibs status` command.

use super::session::{SiteSession, with_site};
use crate::cli::SiteEnvArgs;
use crate::config::{Config, SiteEnv};
use crate::coordinator::LockStatus;
use crate::error::Result;

/// Execute the `dibs status` command.
pub fn cmd_status(config: &Config, args: SiteEnvArgs) -> Result<()> {
    let site_env = SiteEnv::parse(&args.site_env)?;
    let status = with_site(config, &site_env.site, |session| {
        env_status(session, &site_env.env)
    })?;

    println!("{}", describe_status(&site_env.env, &status));
    Ok(())
}

pub(crate) fn env_status(session: &SiteSession<'_>, env: &str) -> Result<LockStatus> {
    session.require_env(env)?;
    Ok(session.coordinator().status(env))
}

/// One-line summary of `status` for `env`.
pub(crate) fn describe_status(env: &str, status: &LockStatus) -> String {
    match status {
        LockStatus::Unlocked => format!("No one has called dibs on {}.", env),
        LockStatus::Locked(record) => format!(
            "{} called dibs on {} on {}: {}",
            record.owner,
            env,
            record.claimed_at_display(),
            record.message_text()
        ),
    }
}
