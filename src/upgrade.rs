//! Upgrade execution with the safe-mode gate
//!
//! Upgrades run one package at a time through the project's package manager.
//! In safe mode major upgrades are refused before any command runs, and a
//! batch stops at the first upgrade that does not succeed.

use crate::domain::{PackageManager, UpgradeAction, UpgradeClass, UpgradeOptions, UpgradeResult};
use crate::process::{ProcessOutput, ProcessRunner};
use std::path::Path;

/// Returns true if safe mode refuses this action
pub fn is_blocked(action: &UpgradeAction, options: UpgradeOptions) -> bool {
    options.safe_mode && action.class == UpgradeClass::Major
}

/// Upgrade a single package
pub async fn upgrade<R: ProcessRunner + ?Sized>(
    runner: &R,
    manager: PackageManager,
    action: &UpgradeAction,
    options: UpgradeOptions,
    project_dir: &Path,
) -> UpgradeResult {
    if is_blocked(action, options) {
        tracing::debug!(package = %action.name, "major upgrade blocked by safe mode");
        return UpgradeResult::blocked(action);
    }

    let args = manager.upgrade_args(&action.name, &action.target_version, options.dry_run);
    let result = runner
        .run(manager.program(), &args, project_dir)
        .await
        .and_then(ProcessOutput::into_checked);

    match result {
        Ok(output) if options.dry_run => UpgradeResult::simulated(action, output.stdout),
        Ok(output) => UpgradeResult::applied(action, output.stdout),
        Err(e) => {
            tracing::debug!(package = %action.name, error = %e, "upgrade failed");
            UpgradeResult::failed(action, e.to_string())
        }
    }
}

/// Upgrade several packages strictly in order.
///
/// With safe mode on, the first result that is not a success ends the batch
/// and the remaining actions are not attempted.
pub async fn upgrade_many<R: ProcessRunner + ?Sized>(
    runner: &R,
    manager: PackageManager,
    actions: &[UpgradeAction],
    options: UpgradeOptions,
    project_dir: &Path,
) -> Vec<UpgradeResult> {
    let mut results = Vec::with_capacity(actions.len());

    for action in actions {
        let result = upgrade(runner, manager, action, options, project_dir).await;
        let stop = !result.success() && options.safe_mode;
        results.push(result);
        if stop {
            tracing::debug!(
                remaining = actions.len() - results.len(),
                "batch stopped by safe mode"
            );
            break;
        }
    }

    results
}
