//! Session orchestrator for loading snapshots and applying upgrades
//!
//! This module provides:
//! - Snapshot loading: detect → read manifest → (outdated ‖ conflicts)
//! - Batch application with reload after a successful, persisted batch
//! - Degradation of probe failures into snapshot data

use crate::conflicts::check_conflicts;
use crate::domain::{OutdatedReport, Snapshot, UpgradeAction, UpgradeOptions, UpgradeResult};
use crate::error::AppError;
use crate::manifest::{detect_package_manager, extract_dependencies, read_package_json};
use crate::outdated::{list_outdated, retain_declared};
use crate::process::ProcessRunner;
use crate::progress::Progress;
use crate::upgrade::upgrade_many;
use std::path::PathBuf;
use std::sync::Arc;

/// Orchestrator for one project directory
pub struct Orchestrator {
    /// Runner used for every package manager command
    runner: Arc<dyn ProcessRunner>,
    /// Project root
    project_dir: PathBuf,
    /// Whether to show a spinner while loading
    show_progress: bool,
}

/// Result of applying a batch of upgrades
#[derive(Debug)]
pub struct ApplyOutcome {
    /// One result per attempted action, in submission order
    pub results: Vec<UpgradeResult>,
    /// The reloaded snapshot, when the batch changed the project and the reload worked
    pub refreshed: Option<Snapshot>,
}

impl ApplyOutcome {
    /// Returns true if every attempted action succeeded
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(UpgradeResult::success)
    }
}

impl Orchestrator {
    /// Create an orchestrator for `project_dir`
    pub fn new(runner: Arc<dyn ProcessRunner>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            project_dir: project_dir.into(),
            show_progress: false,
        }
    }

    /// Enable or disable the loading spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build a fresh snapshot of the project.
    ///
    /// A missing or malformed package.json is fatal. Probe failures are not:
    /// an outdated report that cannot be obtained is recorded as
    /// [`OutdatedReport::Unavailable`], and conflict probes never fail.
    pub async fn load(&self) -> Result<Snapshot, AppError> {
        let mut progress = Progress::new(self.show_progress);

        progress.spinner("Reading package.json...");
        let manager = detect_package_manager(&self.project_dir);
        let manifest = read_package_json(&self.project_dir)?;
        let dependencies = extract_dependencies(&manifest);
        tracing::debug!(%manager, count = dependencies.len(), "loaded manifest");

        progress.set_message(&format!("Checking dependencies with {}...", manager));
        let runner = self.runner.as_ref();
        let (outdated, conflicts) = tokio::join!(
            list_outdated(runner, manager, &self.project_dir),
            check_conflicts(runner, manager, &self.project_dir),
        );
        progress.finish_and_clear();

        let outdated = match outdated {
            Ok(entries) => OutdatedReport::Available {
                entries: retain_declared(entries, &dependencies),
            },
            Err(e) => {
                tracing::warn!(%manager, error = %e, "outdated report unavailable");
                OutdatedReport::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        Ok(Snapshot {
            manager,
            project_dir: self.project_dir.clone(),
            dependencies,
            outdated,
            conflicts,
        })
    }

    /// Run `actions` against the project of `snapshot`.
    ///
    /// The project is reloaded only after a batch that was not a dry run and
    /// in which every action succeeded. If that reload fails, the caller keeps
    /// using `snapshot`.
    pub async fn apply(
        &self,
        snapshot: &Snapshot,
        actions: &[UpgradeAction],
        options: UpgradeOptions,
    ) -> ApplyOutcome {
        let results = upgrade_many(
            self.runner.as_ref(),
            snapshot.manager,
            actions,
            options,
            &snapshot.project_dir,
        )
        .await;

        let mut outcome = ApplyOutcome {
            results,
            refreshed: None,
        };
        if options.dry_run || outcome.results.is_empty() || !outcome.all_succeeded() {
            return outcome;
        }

        match self.load().await {
            Ok(refreshed) => outcome.refreshed = Some(refreshed),
            Err(e) => tracing::warn!(error = %e, "failed to reload after upgrade"),
        }
        outcome
    }
}
