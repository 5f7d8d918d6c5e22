//! Conflict records produced by the conflict heuristics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a detected conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth attention, install still works
    Warning,
    /// Likely to break installs
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single conflict signal.
///
/// Several heuristics may report the same package, so a list of conflicts
/// is a multiset rather than a map keyed by package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Package the signal refers to, `unknown` or `project` when unattributed
    pub package: String,
    /// Human readable reason
    pub reason: String,
    /// Severity
    pub severity: Severity,
}

impl Conflict {
    /// Creates a new conflict
    pub fn new(package: impl Into<String>, reason: impl Into<String>, severity: Severity) -> Self {
        Self {
            package: package.into(),
            reason: reason.into(),
            severity,
        }
    }

    /// Creates a warning
    pub fn warning(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(package, reason, Severity::Warning)
    }

    /// Creates an error
    pub fn error(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(package, reason, Severity::Error)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.package, self.reason)
    }
}
