//! Snapshot summary counts

use crate::domain::{PackageManager, Severity, Snapshot, UpdateClass};
use serde::Serialize;
use std::fmt;

/// Outdated packages per update class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutdatedCounts {
    pub major: usize,
    pub minor: usize,
    pub patch: usize,
}

impl OutdatedCounts {
    /// Total number of outdated packages
    pub fn total(&self) -> usize {
        self.major + self.minor + self.patch
    }

    fn add(&mut self, class: UpdateClass) {
        match class {
            UpdateClass::Major => self.major += 1,
            UpdateClass::Minor => self.minor += 1,
            UpdateClass::Patch => self.patch += 1,
        }
    }
}

/// Counts shown in the dashboard header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    /// Detected package manager
    pub manager: PackageManager,
    /// Declared dependencies, dev dependencies included
    pub dependencies: usize,
    /// Declared dev dependencies
    pub dev_dependencies: usize,
    /// Outdated counts, `None` when the report is unavailable
    pub outdated: Option<OutdatedCounts>,
    /// Conflict signals
    pub conflicts: usize,
    /// Conflict signals with error severity
    pub conflict_errors: usize,
}

impl SnapshotSummary {
    /// Count a snapshot
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let outdated = snapshot.outdated.count().map(|_| {
            let mut counts = OutdatedCounts::default();
            for entry in snapshot.outdated.entries() {
                counts.add(entry.update_class);
            }
            counts
        });

        Self {
            manager: snapshot.manager,
            dependencies: snapshot.dependencies.len(),
            dev_dependencies: snapshot.dependencies.iter().filter(|d| d.is_dev()).count(),
            outdated,
            conflicts: snapshot.conflicts.len(),
            conflict_errors: snapshot
                .conflicts
                .iter()
                .filter(|c| c.severity == Severity::Error)
                .count(),
        }
    }

    /// Returns true if any package has an update
    pub fn has_outdated(&self) -> bool {
        self.outdated.is_some_and(|counts| counts.total() > 0)
    }
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} dependencies ({} dev), ",
            self.manager, self.dependencies, self.dev_dependencies
        )?;
        match self.outdated {
            Some(counts) => write!(
                f,
                "{} outdated ({} major, {} minor, {} patch)",
                counts.total(),
                counts.major,
                counts.minor,
                counts.patch
            )?,
            None => write!(f, "outdated unknown")?,
        }
        write!(f, ", {} conflicts", self.conflicts)
    }
}
