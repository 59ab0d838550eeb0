//! Implementation of the `dibs claim` command.

use super::session::{SiteSession, with_site};
use crate::cli::ClaimArgs;
use crate::config::{Config, DibsOptions, Target};
use crate::error::{DibsError, Result};
use crate::identity::current_identity;

/// Execute the `dibs claim` command.
pub fn cmd_claim(config: &Config, args: ClaimArgs) -> Result<()> {
    let opts = DibsOptions::for_env(&args.site_env)?.with_message(&args.message);
    let Target::Env(site_env) = &opts.target else {
        return Err(DibsError::ValidationError("claim needs a `site-name.env` target".to_string()));
    };
    let owner = current_identity(config.identity.as_deref());

    let env = with_site(config, &site_env.site, |session| {
        claim_env(session, &site_env.env, &owner, opts.message.as_deref())
    })?;

    println!("Called dibs on the {} environment.", env);
    Ok(())
}

/// Call dibs on a named environment of the session's site.
pub(crate) fn claim_env(
    session: &SiteSession<'_>,
    env: &str,
    owner: &str,
    message: Option<&str>,
) -> Result<String> {
    session.require_env(env)?;
    session.coordinator().acquire(env, owner, message)
}
