//! Implementation of the `dibs release` command.

use super::session::{SiteSession, with_site};
use crate::cli::SiteEnvArgs;
use crate::config::{Config, SiteEnv};
use crate::error::Result;

/// Execute the `dibs release` command.
pub fn cmd_release(config: &Config, args: SiteEnvArgs) -> Result<()> {
    let site_env = SiteEnv::parse(&args.site_env)?;
    let env = with_site(config, &site_env.site, |session| {
        release_env(session, &site_env.env)
    })?;

    println!("Released dibs on the {} environment.", env);
    Ok(())
}

/// Remove the dibs on `env`, whoever holds it.
pub(crate) fn release_env(session: &SiteSession<'_>, env: &str) -> Result<String> {
    session.require_env(env)?;
    session.coordinator().release(env)
}
