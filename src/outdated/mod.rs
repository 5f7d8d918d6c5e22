//! Outdated report normalization
//!
//! This module provides:
//! - Running each manager's outdated command and parsing its report
//! - Classifying every entry as a patch, minor or major update
//! - Dropping entries for packages the manifest does not declare

mod classify;
mod parse;

pub use classify::{classify, coerce, is_major_upgrade};
pub use parse::{parse_json_report, parse_text_report, ReportRow};

use crate::domain::{Dependency, OutdatedEntry, PackageManager, ReportFormat};
use crate::error::{OutdatedError, ProcessError};
use crate::process::{to_args, ProcessRunner};
use std::collections::HashSet;
use std::path::Path;

impl From<ReportRow> for OutdatedEntry {
    fn from(row: ReportRow) -> Self {
        let update_class = classify(&row.current, &row.wanted, &row.latest);
        OutdatedEntry {
            name: row.name,
            current: row.current,
            wanted: row.wanted,
            latest: row.latest,
            update_class,
        }
    }
}

/// List the outdated packages of the project in `project_dir`.
///
/// Most managers exit non-zero when anything is outdated, so the exit status
/// alone does not decide failure: a failed run whose output still parses is
/// a normal report. A run that exited 0 with output that does not parse is
/// treated as having nothing outdated.
pub async fn list_outdated<R: ProcessRunner + ?Sized>(
    runner: &R,
    manager: PackageManager,
    project_dir: &Path,
) -> Result<Vec<OutdatedEntry>, OutdatedError> {
    let commands = manager.commands();
    let output = runner
        .run(commands.program, &to_args(commands.outdated), project_dir)
        .await?;

    // (rows, whether the output actually carried a report)
    let parsed = match commands.outdated_format {
        ReportFormat::Json => parse_json_report(&output.stdout)
            .map(|rows| (rows, !output.stdout.trim().is_empty())),
        ReportFormat::Text => {
            let rows = parse_text_report(&output.stdout);
            let present = !rows.is_empty();
            Ok((rows, present))
        }
    };

    match parsed {
        Ok((rows, present)) if output.success() || present => {
            Ok(rows.into_iter().map(OutdatedEntry::from).collect())
        }
        Ok(_) => Err(ProcessError::non_zero_exit(
            &output.command,
            output.code,
            output.combined(),
        )
        .into()),
        Err(message) if output.success() => {
            tracing::debug!(%manager, %message, "unparseable outdated output");
            Ok(Vec::new())
        }
        Err(message) => Err(OutdatedError::parse(manager.program(), message)),
    }
}

/// Keep only entries for declared dependencies
pub fn retain_declared(
    entries: Vec<OutdatedEntry>,
    dependencies: &[Dependency],
) -> Vec<OutdatedEntry> {
    let declared: HashSet<&str> = dependencies.iter().map(|d| d.name.as_str()).collect();
    entries
        .into_iter()
        .filter(|entry| declared.contains(entry.name.as_str()))
        .collect()
}
