//! Outdated package entries and update classes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic tier of an available update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateClass {
    /// Bug fixes only
    Patch,
    /// Backwards-compatible features
    Minor,
    /// Breaking changes
    Major,
}

impl UpdateClass {
    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            UpdateClass::Patch => "patch",
            UpdateClass::Minor => "minor",
            UpdateClass::Major => "major",
        }
    }
}

impl fmt::Display for UpdateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A package with an available update, as reported by the package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedEntry {
    /// Package name
    pub name: String,
    /// Installed version; empty when the package is not installed
    pub current: String,
    /// Highest version satisfying the declared range; empty when unreported
    pub wanted: String,
    /// Highest published version
    pub latest: String,
    /// Classification derived from the three versions
    pub update_class: UpdateClass,
}

impl OutdatedEntry {
    /// Installed version, if the package is installed
    pub fn installed(&self) -> Option<&str> {
        Some(self.current.as_str()).filter(|v| !v.is_empty())
    }
}

/// Outcome of the outdated probe for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutdatedReport {
    /// The manager produced a usable report
    Available { entries: Vec<OutdatedEntry> },
    /// The report could not be obtained; outdated state is unknown
    Unavailable { reason: String },
}

impl OutdatedReport {
    /// Returns the entries, or an empty slice when the report is unavailable
    pub fn entries(&self) -> &[OutdatedEntry] {
        match self {
            OutdatedReport::Available { entries } => entries,
            OutdatedReport::Unavailable { .. } => &[],
        }
    }

    /// Find the entry for a package
    pub fn find(&self, name: &str) -> Option<&OutdatedEntry> {
        self.entries().iter().find(|e| e.name == name)
    }

    /// Returns true when outdated data could not be obtained
    pub fn is_unavailable(&self) -> bool {
        matches!(self, OutdatedReport::Unavailable { .. })
    }

    /// Number of outdated entries, `None` when unknown
    pub fn count(&self) -> Option<usize> {
        match self {
            OutdatedReport::Available { entries } => Some(entries.len()),
            OutdatedReport::Unavailable { .. } => None,
        }
    }
}

impl Default for OutdatedReport {
    fn default() -> Self {
        OutdatedReport::Available {
            entries: Vec::new(),
        }
    }
}
