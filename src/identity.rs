//! Who is calling dibs.

/// Name recorded as the owner when none is configured and the login name
/// cannot be found.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Resolve the claimant's identity from the process environment.
///
/// Order: explicit override, `$USER`, `$USERNAME`, then [`UNKNOWN_IDENTITY`].
pub fn current_identity(override_name: Option<&str>) -> String {
    identity_from(override_name, |key| std::env::var(key).ok())
}

/// [`current_identity`] with the variable lookup supplied by the caller.
pub fn identity_from<F>(override_name: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    override_name
        .map(str::to_string)
        .into_iter()
        .chain(["USER", "USERNAME"].iter().filter_map(|key| lookup(key)))
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}
