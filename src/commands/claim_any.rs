//! Implementation of the `dibs claim-any` command.

use super::session::{SiteSession, with_site};
use crate::cli::ClaimAnyArgs;
use crate::config::{Config, DibsOptions, Target};
use crate::error::{DibsError, Result};
use crate::identity::current_identity;
use crate::select::{EnvFilter, select_candidate};
use tracing::info;

/// Execute the `dibs claim-any` command.
pub fn cmd_claim_any(config: &Config, args: ClaimAnyArgs) -> Result<()> {
    let opts =
        DibsOptions::for_site(&args.site, args.filter.as_deref())?.with_message(&args.message);
    let Target::Site { site, filter } = &opts.target else {
        return Err(DibsError::ValidationError("claim-any needs a site name".to_string()));
    };
    let filter = config.filter_for(filter.as_deref())?;
    let owner = current_identity(config.identity.as_deref());

    let env = with_site(config, site, |session| {
        claim_any(session, &filter, &owner, opts.message.as_deref())
    })?;

    println!("Called dibs on the {} environment.", env);
    Ok(())
}

/// Pick the first free, ready environment passing `filter` and call dibs on it.
///
/// Selection and claim are separate steps: another claimant can take the
/// chosen environment in between, in which case the claim fails with a
/// conflict rather than moving on to the next candidate.
pub(crate) fn claim_any(
    session: &SiteSession<'_>,
    filter: &EnvFilter,
    owner: &str,
    message: Option<&str>,
) -> Result<String> {
    let pool = session.pool()?;
    let Some(env) = select_candidate(&pool, filter, session.locks, session.readiness) else {
        return Err(DibsError::ValidationError(
            "Unable to find an environment to call dibs on.".to_string(),
        ));
    };
    info!(env = %env, filter = %filter, "selected environment");
    session.coordinator().acquire(&env, owner, message)
}
