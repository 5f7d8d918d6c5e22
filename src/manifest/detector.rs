//! Package manager detection by lockfile
//!
//! Lockfiles are checked in a fixed priority order:
//! - bun (`bun.lockb`, `bun.lock`)
//! - pnpm (`pnpm-lock.yaml`)
//! - yarn (`yarn.lock`)
//! - npm (`package-lock.json`)
//!
//! The first manager with a lockfile present wins. Without any lockfile the
//! project is treated as an npm project.

use crate::domain::PackageManager;
use std::path::Path;

/// Detect the package manager used by the project in `dir`
pub fn detect_package_manager(dir: &Path) -> PackageManager {
    PackageManager::detection_order()
        .iter()
        .copied()
        .find(|manager| has_lockfile(dir, *manager))
        .unwrap_or(PackageManager::Npm)
}

/// Returns true if any lockfile of `manager` exists in `dir`.
///
/// Unreadable paths count as missing.
pub fn has_lockfile(dir: &Path, manager: PackageManager) -> bool {
    manager
        .lockfiles()
        .iter()
        .any(|lockfile| dir.join(lockfile).exists())
}
