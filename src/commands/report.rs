//! Implementation of the `dibs report` command.

use super::session::{SiteSession, with_site};
use crate::cli::ReportArgs;
use crate::config::{Config, DibsOptions, Target};
use crate::error::{DibsError, Result};
use crate::report::{ReportRow, report};
use crate::select::EnvFilter;
use chrono::Utc;

const HEADERS: [&str; 5] = ["Environment", "Status", "By", "At", "Message"];

/// Execute the `dibs report` command.
pub fn cmd_report(config: &Config, args: ReportArgs) -> Result<()> {
    let opts = DibsOptions::for_site(&args.site, args.filter.as_deref())?
        .with_age_threshold(args.older_than);
    let Target::Site { site, filter } = &opts.target else {
        return Err(DibsError::ValidationError("report needs a site name".to_string()));
    };
    let filter = config.filter_for(filter.as_deref())?;

    let rows = with_site(config, site, |session| {
        site_report(session, &filter, opts.age_threshold_secs)
    })?;

    if rows.is_empty() {
        println!("No environments to report.");
    } else {
        print!("{}", render_table(&rows));
    }
    Ok(())
}

pub(crate) fn site_report(
    session: &SiteSession<'_>,
    filter: &EnvFilter,
    age_threshold_secs: u64,
) -> Result<Vec<ReportRow>> {
    let pool = session.pool()?;
    Ok(report(
        &pool,
        filter,
        age_threshold_secs,
        Utc::now(),
        session.locks,
        session.readiness,
    ))
}

/// Render rows as a left-aligned table with a header and separator line.
pub(crate) fn render_table(rows: &[ReportRow]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.env.clone(),
                row.status.to_string(),
                row.owner.clone().unwrap_or_default(),
                row.claimed_at_display(),
                row.message.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    push_line(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
