//! Core domain models for depdash
//!
//! This module contains the fundamental types used throughout the application:
//! - Package manager types and their command table
//! - Declared dependencies
//! - Outdated entries and update classes
//! - Conflict signals
//! - Upgrade requests and results
//! - Registry metadata
//! - The loaded project snapshot

mod conflict;
mod dependency;
mod metadata;
mod outdated;
mod package_manager;
mod snapshot;
mod upgrade;

pub use conflict::{Conflict, Severity};
pub use dependency::{Dependency, DependencyKind};
pub use metadata::{Author, Maintainer, PackageMetadata, PublishTimes, Repository};
pub use outdated::{OutdatedEntry, OutdatedReport, UpdateClass};
pub use package_manager::{ManagerCommands, PackageManager, ReportFormat};
pub use snapshot::Snapshot;
pub use upgrade::{
    resolve_target, UpgradeAction, UpgradeClass, UpgradeOptions, UpgradeResult, UpgradeStatus,
};
