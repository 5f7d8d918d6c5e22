//! Best-effort conflict detection
//!
//! Two probes feed the conflict list:
//! - An install simulation whose output is scanned for warning keywords
//! - A dependency tree listing whose peer/unmet lines name the packages involved
//!
//! Neither probe can fail the caller. Whatever a probe cannot run or
//! understand simply contributes no conflicts.

use crate::domain::{Conflict, PackageManager};
use crate::process::{to_args, ProcessRunner};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

const PEER_REASON: &str = "Missing or incompatible peer dependency";
const DEPRECATED_REASON: &str = "Package is deprecated";
const CONFLICT_REASON: &str = "Dependency conflict detected";
const TREE_PEER_REASON: &str = "Peer dependency issue";
const TREE_ERROR_REASON: &str = "Peer dependency conflict";
const PROBE_ERROR_REASON: &str = "Peer dependency conflict detected";

const KEYWORDS: &[&str] = &["warning", "peer", "conflict", "deprecated", "unmet"];

static PEER_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)requires a peer of\s+(@?[^@\s]+)").unwrap());
static NAME_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:@[\w.-]+/)?[\w.-]+)@").unwrap());
static PEER_DEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)peer dep[^:]*:\s*([^\n]+)").unwrap());

/// Run both probes and concatenate their findings, install simulation first.
///
/// The same package may be reported more than once.
pub async fn check_conflicts<R: ProcessRunner + ?Sized>(
    runner: &R,
    manager: PackageManager,
    project_dir: &Path,
) -> Vec<Conflict> {
    let mut conflicts = install_probe(runner, manager, project_dir).await;
    conflicts.extend(tree_probe(runner, manager, project_dir).await);
    tracing::debug!(%manager, count = conflicts.len(), "conflict probes finished");
    conflicts
}

async fn install_probe<R: ProcessRunner + ?Sized>(
    runner: &R,
    manager: PackageManager,
    project_dir: &Path,
) -> Vec<Conflict> {
    let commands = manager.commands();
    match runner
        .run(commands.program, &to_args(commands.dry_run_install), project_dir)
        .await
    {
        Ok(output) => scan_install_output(&output.combined()),
        Err(e) => {
            tracing::debug!(error = %e, "install simulation did not run");
            if e.to_string().contains("peer dep") {
                vec![Conflict::warning("unknown", PROBE_ERROR_REASON)]
            } else {
                Vec::new()
            }
        }
    }
}

async fn tree_probe<R: ProcessRunner + ?Sized>(
    runner: &R,
    manager: PackageManager,
    project_dir: &Path,
) -> Vec<Conflict> {
    let Some(list_tree) = manager.commands().list_tree else {
        return Vec::new();
    };

    // npm exits non-zero exactly when the tree has peer problems
    match runner
        .run(manager.program(), &to_args(list_tree), project_dir)
        .await
    {
        Ok(output) if output.success() => scan_tree_output(&output.combined()),
        Ok(output) => scan_failed_tree_output(&output.combined()),
        Err(e) => scan_tree_error(&e.to_string()),
    }
}

/// Classify one warning line from an install simulation.
///
/// Checks run in a fixed order: peer first, then deprecated, then conflict.
/// A line mentioning both a peer and a deprecation is a peer problem.
pub fn classify_warning(line: &str) -> Option<Conflict> {
    let lower = line.to_lowercase();

    if lower.contains("peer") {
        let package = PEER_OF_RE
            .captures(line)
            .map_or("unknown", |caps| caps.get(1).map_or("unknown", |m| m.as_str()));
        return Some(Conflict::warning(package, PEER_REASON));
    }

    if lower.contains("deprecated") {
        let package = first_package(line).unwrap_or("unknown");
        return Some(Conflict::warning(package, DEPRECATED_REASON));
    }

    if lower.contains("conflict") {
        return Some(Conflict::error("project", CONFLICT_REASON));
    }

    None
}

/// Scan install simulation output for conflict signals
pub fn scan_install_output(output: &str) -> Vec<Conflict> {
    output
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .filter_map(|line| classify_warning(line.trim()))
        .collect()
}

/// Scan a successful tree listing for peer/unmet lines
pub fn scan_tree_output(output: &str) -> Vec<Conflict> {
    output
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("peer") || lower.contains("unmet")
        })
        .filter_map(first_package)
        .map(|package| Conflict::warning(package, TREE_PEER_REASON))
        .collect()
}

/// Extract `peer dep ...: detail` segments from a failed tree listing
pub fn scan_tree_error(error_text: &str) -> Vec<Conflict> {
    PEER_DEP_RE
        .captures_iter(error_text)
        .filter_map(|caps| caps.get(1).and_then(|detail| first_package(detail.as_str())))
        .map(|package| Conflict::error(package, TREE_ERROR_REASON))
        .collect()
}

/// Scan the output of a tree listing that exited non-zero.
///
/// `peer dep ...: detail` lines are conflicts; any other peer/unmet line is
/// reported the same way as in a successful listing.
pub fn scan_failed_tree_output(output: &str) -> Vec<Conflict> {
    output
        .lines()
        .flat_map(|line| {
            let conflicts = scan_tree_error(line);
            if conflicts.is_empty() {
                scan_tree_output(line)
            } else {
                conflicts
            }
        })
        .collect()
}

fn first_package(text: &str) -> Option<&str> {
    NAME_AT_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
