//! Upgrade request and result types

use super::{Dependency, OutdatedEntry, UpdateClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upgrade class requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeClass {
    /// Patch-level upgrade
    Patch,
    /// Minor-level upgrade
    Minor,
    /// Major-level upgrade
    Major,
    /// Jump to the latest published version
    Latest,
    /// Move to the highest version the declared range allows
    Wanted,
}

impl UpgradeClass {
    /// Returns all upgrade classes
    pub fn all() -> &'static [UpgradeClass] {
        &[
            UpgradeClass::Patch,
            UpgradeClass::Minor,
            UpgradeClass::Major,
            UpgradeClass::Latest,
            UpgradeClass::Wanted,
        ]
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeClass::Patch => "patch",
            UpgradeClass::Minor => "minor",
            UpgradeClass::Major => "major",
            UpgradeClass::Latest => "latest",
            UpgradeClass::Wanted => "wanted",
        }
    }
}

impl From<UpdateClass> for UpgradeClass {
    fn from(class: UpdateClass) -> Self {
        match class {
            UpdateClass::Patch => UpgradeClass::Patch,
            UpdateClass::Minor => UpgradeClass::Minor,
            UpdateClass::Major => UpgradeClass::Major,
        }
    }
}

impl fmt::Display for UpgradeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for UpgradeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpgradeClass::all()
            .iter()
            .find(|class| class.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                format!(
                    "invalid upgrade class '{}': expected patch, minor, major, latest or wanted",
                    s
                )
            })
    }
}

/// Pick the version an upgrade of the given class should install.
///
/// Range-bound classes move to `wanted`; only `latest` ignores the range.
pub fn resolve_target<'a>(
    _current: &'a str,
    wanted: &'a str,
    latest: &'a str,
    class: UpgradeClass,
) -> &'a str {
    match class {
        UpgradeClass::Patch | UpgradeClass::Minor | UpgradeClass::Major | UpgradeClass::Wanted => {
            wanted
        }
        UpgradeClass::Latest => latest,
    }
}

/// A single requested upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeAction {
    /// Package name
    pub name: String,
    /// Declared range before the upgrade
    pub current_version_spec: String,
    /// Version to install
    pub target_version: String,
    /// Requested class
    pub class: UpgradeClass,
}

impl UpgradeAction {
    /// Creates a new upgrade action
    pub fn new(
        name: impl Into<String>,
        current_version_spec: impl Into<String>,
        target_version: impl Into<String>,
        class: UpgradeClass,
    ) -> Self {
        Self {
            name: name.into(),
            current_version_spec: current_version_spec.into(),
            target_version: target_version.into(),
            class,
        }
    }

    /// Build an action for a dependency, resolving the target from its outdated entry.
    ///
    /// Without an entry, or when the entry does not report the resolved
    /// version, the declared range is reinstalled.
    pub fn for_entry(
        dependency: &Dependency,
        entry: Option<&OutdatedEntry>,
        class: UpgradeClass,
    ) -> Self {
        let target = entry
            .map(|entry| resolve_target(&entry.current, &entry.wanted, &entry.latest, class))
            .filter(|target| !target.is_empty())
            .unwrap_or(dependency.current_version_spec.as_str());
        Self::new(
            &dependency.name,
            &dependency.current_version_spec,
            target,
            class,
        )
    }
}

/// Options shared by every action of a single or batch upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOptions {
    /// Simulate without persisting changes
    pub dry_run: bool,
    /// Refuse major upgrades and stop a batch at the first failure
    pub safe_mode: bool,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            safe_mode: true,
        }
    }
}

/// How an upgrade ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStatus {
    /// The package manager installed the new version
    Applied,
    /// The package manager simulated the upgrade
    Simulated,
    /// Safe mode refused the upgrade; nothing was run
    Blocked,
    /// The package manager failed
    Failed,
}

/// Result of one upgrade action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeResult {
    /// Package this result belongs to
    pub name: String,
    /// Outcome
    pub status: UpgradeStatus,
    /// Human readable summary
    pub message: String,
    /// Raw captured output, when a process ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl UpgradeResult {
    /// Creates an applied result
    pub fn applied(action: &UpgradeAction, output: impl Into<String>) -> Self {
        Self {
            name: action.name.clone(),
            status: UpgradeStatus::Applied,
            message: format!(
                "Successfully upgraded {} to {}",
                action.name, action.target_version
            ),
            raw_output: Some(output.into()),
        }
    }

    /// Creates a simulated result
    pub fn simulated(action: &UpgradeAction, output: impl Into<String>) -> Self {
        Self {
            name: action.name.clone(),
            status: UpgradeStatus::Simulated,
            message: format!(
                "Successfully simulated {} to {}",
                action.name, action.target_version
            ),
            raw_output: Some(output.into()),
        }
    }

    /// Creates a result for an upgrade refused by safe mode
    pub fn blocked(action: &UpgradeAction) -> Self {
        Self {
            name: action.name.clone(),
            status: UpgradeStatus::Blocked,
            message: "Major upgrade blocked in safe mode. Use --no-safe-mode to proceed."
                .to_string(),
            raw_output: None,
        }
    }

    /// Creates a failed result; the error text doubles as raw output
    pub fn failed(action: &UpgradeAction, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            name: action.name.clone(),
            status: UpgradeStatus::Failed,
            message: format!("Failed to upgrade {}: {}", action.name, error),
            raw_output: Some(error),
        }
    }

    /// Returns true if the upgrade ran (or was simulated) successfully
    pub fn success(&self) -> bool {
        matches!(
            self.status,
            UpgradeStatus::Applied | UpgradeStatus::Simulated
        )
    }

    /// Returns true if safe mode refused the upgrade
    pub fn is_blocked(&self) -> bool {
        self.status == UpgradeStatus::Blocked
    }
}

impl fmt::Display for UpgradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
