//! package.json reader for Node.js projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//!
//! Declared order is kept as written in the manifest.

use crate::domain::{Dependency, DependencyKind};
use crate::error::ManifestError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the Node.js manifest
pub const PACKAGE_JSON: &str = "package.json";

/// The parts of package.json the dashboard reads
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Map<String, Value>,
    #[serde(default)]
    pub dev_dependencies: Map<String, Value>,
}

impl PackageJson {
    /// Parse manifest content
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))
    }

    /// Returns `(dependencies, devDependencies)` counts
    pub fn dependency_counts(&self) -> (usize, usize) {
        (self.dependencies.len(), self.dev_dependencies.len())
    }
}

/// Read and parse `package.json` from `project_dir`
pub fn read_package_json(project_dir: &Path) -> Result<PackageJson, ManifestError> {
    let path = project_dir.join(PACKAGE_JSON);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::not_found(project_dir));
        }
        Err(e) => return Err(ManifestError::read_error(&path, e)),
    };
    PackageJson::parse(&content, &path)
}

/// Flatten the manifest into dependencies followed by devDependencies.
///
/// Entries whose range is not a string are skipped.
pub fn extract_dependencies(manifest: &PackageJson) -> Vec<Dependency> {
    let (deps, dev_deps) = manifest.dependency_counts();
    let mut dependencies = Vec::with_capacity(deps + dev_deps);
    push_section(
        &manifest.dependencies,
        DependencyKind::Dependency,
        &mut dependencies,
    );
    push_section(
        &manifest.dev_dependencies,
        DependencyKind::DevDependency,
        &mut dependencies,
    );
    dependencies
}

fn push_section(
    section: &Map<String, Value>,
    kind: DependencyKind,
    output: &mut Vec<Dependency>,
) {
    for (name, range) in section {
        match range.as_str() {
            Some(range) => output.push(Dependency::new(name.clone(), range, kind)),
            None => tracing::debug!(package = %name, "skipping non-string version range"),
        }
    }
}
