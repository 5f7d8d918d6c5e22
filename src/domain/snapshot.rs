//! Immutable view of a project's dependency state

use super::{Conflict, Dependency, OutdatedEntry, OutdatedReport, PackageManager};
use serde::Serialize;
use std::path::PathBuf;

/// Everything one load learned about a project.
///
/// A snapshot is built in one go and replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Detected package manager
    pub manager: PackageManager,
    /// Project root
    pub project_dir: PathBuf,
    /// Declared dependencies in manifest order
    pub dependencies: Vec<Dependency>,
    /// Outdated report
    pub outdated: OutdatedReport,
    /// Conflict signals from both probes
    pub conflicts: Vec<Conflict>,
}

impl Snapshot {
    /// Find a declared dependency by name
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// Outdated entry for a package, if it has an update
    pub fn outdated_entry(&self, name: &str) -> Option<&OutdatedEntry> {
        self.outdated.find(name)
    }

    /// Conflicts reported against a package
    pub fn conflicts_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Conflict> + 'a {
        self.conflicts.iter().filter(move |c| c.package == name)
    }

    /// Returns true if the project declares no dependencies
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}
