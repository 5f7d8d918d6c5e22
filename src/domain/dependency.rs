//! Dependency information structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which manifest section a dependency was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    /// `dependencies`
    Dependency,
    /// `devDependencies`
    DevDependency,
}

/// Represents a dependency declared in package.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// The declared range as written in the manifest (e.g. `^1.2.0`)
    pub current_version_spec: String,
    /// Manifest section
    pub kind: DependencyKind,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(
        name: impl Into<String>,
        current_version_spec: impl Into<String>,
        kind: DependencyKind,
    ) -> Self {
        Self {
            name: name.into(),
            current_version_spec: current_version_spec.into(),
            kind,
        }
    }

    /// Creates a new production dependency
    pub fn production(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, spec, DependencyKind::Dependency)
    }

    /// Creates a new development dependency
    pub fn development(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, spec, DependencyKind::DevDependency)
    }

    /// Returns true if this is a development dependency
    pub fn is_dev(&self) -> bool {
        self.kind == DependencyKind::DevDependency
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_dev() { " (dev)" } else { "" };
        write!(f, "{}@{}{}", self.name, self.current_version_spec, dev_marker)
    }
}
