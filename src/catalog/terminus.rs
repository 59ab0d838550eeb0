//! [`SiteCatalog`] backed by the `terminus` command-line client.
//!
//! Authentication and session handling stay with terminus; dibs only runs
//! read-only commands with `--format=json` and parses their output.

use super::{ConnectionInfo, EnvironmentEntry, Framework, SiteCatalog, SiteInfo};
use crate::channel::process::{run_with_timeout, split_command};
use crate::error::{DibsError, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Catalog that shells out to terminus.
#[derive(Debug, Clone)]
pub struct TerminusCatalog {
    argv: Vec<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SiteInfoJson {
    name: String,
    #[serde(default)]
    framework: String,
}

impl TerminusCatalog {
    /// Build a catalog from a command line such as `terminus` or
    /// `php /opt/terminus/bin/terminus`.
    pub fn new(command_line: &str, timeout: Duration) -> Result<Self> {
        let argv = split_command(command_line).map_err(|e| {
            DibsError::ConfigError(format!("invalid terminus_command: {}", e))
        })?;
        Ok(Self { argv, timeout })
    }

    fn run_json(&self, args: &[&str]) -> Result<Value> {
        debug!(command = %args.join(" "), "running terminus");
        let output = run_with_timeout(&self.argv, args, None, self.timeout).map_err(|e| {
            DibsError::CatalogError(format!("{} (is terminus installed?)", e))
        })?;

        if output.timed_out {
            return Err(DibsError::CatalogError(format!(
                "terminus {} timed out after {}s",
                args.first().unwrap_or(&""),
                self.timeout.as_secs()
            )));
        }
        if !output.is_success() {
            let detail = output
                .stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| output.last_line());
            return Err(DibsError::CatalogError(format!(
                "terminus {} failed: {}",
                args.first().unwrap_or(&""),
                detail
            )));
        }

        serde_json::from_str(&output.stdout).map_err(|e| {
            DibsError::CatalogError(format!(
                "could not parse terminus {} output: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })
    }
}

impl SiteCatalog for TerminusCatalog {
    fn site(&self, site: &str) -> Result<SiteInfo> {
        let value = self.run_json(&["site:info", site, "--format=json"])?;
        parse_site_info(value)
    }

    fn environments(&self, site: &str) -> Result<Vec<EnvironmentEntry>> {
        let value = self.run_json(&["env:list", site, "--format=json"])?;
        parse_environment_list(value)
    }

    fn connection_info(&self, site: &str, env: &str) -> Result<ConnectionInfo> {
        let site_env = format!("{}.{}", site, env);
        let value = self.run_json(&["connection:info", &site_env, "--format=json"])?;
        serde_json::from_value(value).map_err(|e| {
            DibsError::CatalogError(format!("unexpected connection info for {}: {}", site_env, e))
        })
    }
}

fn parse_site_info(value: Value) -> Result<SiteInfo> {
    let json: SiteInfoJson = serde_json::from_value(value)
        .map_err(|e| DibsError::CatalogError(format!("unexpected site info: {}", e)))?;
    Ok(SiteInfo {
        name: json.name,
        framework: Framework::from_catalog(&json.framework),
    })
}

/// Parse `env:list` output, keeping catalog order.
///
/// terminus emits an object keyed by environment id; an array of objects is
/// accepted too.
fn parse_environment_list(value: Value) -> Result<Vec<EnvironmentEntry>> {
    let entries: Vec<(Option<String>, Value)> = match value {
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
        other => {
            return Err(DibsError::CatalogError(format!("unexpected environment list: {}", other)));
        }
    };

    entries
        .into_iter()
        .map(|(key, env)| {
            let id = env
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or(key)
                .ok_or_else(|| {
                    DibsError::CatalogError("environment entry without an id".to_string())
                })?;
            let created = env.get("created").and_then(parse_created);
            Ok(EnvironmentEntry { id, created })
        })
        .collect()
}

/// Creation time as unix seconds, from either a number or a
/// `YYYY-MM-DD HH:MM:SS` UTC string.
fn parse_created(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc().timestamp())
            }),
        _ => None,
    }
}
