//! Project manifest and package manager detection
//!
//! This module provides functionality to:
//! - Detect the package manager from lockfiles
//! - Read package.json and list declared dependencies

mod detector;
mod package_json;

pub use detector::{detect_package_manager, has_lockfile};
pub use package_json::{extract_dependencies, read_package_json, PackageJson, PACKAGE_JSON};
