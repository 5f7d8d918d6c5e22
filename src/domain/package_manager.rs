//! Package manager types and the per-manager command table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported Node.js package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm (package-lock.json)
    Npm,
    /// Yarn (yarn.lock)
    Yarn,
    /// pnpm (pnpm-lock.yaml)
    Pnpm,
    /// Bun (bun.lockb)
    Bun,
}

/// Shape of a manager's outdated report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON object keyed by package name
    Json,
    /// Line-oriented `name current → latest` text
    Text,
}

/// Command templates for one package manager
#[derive(Debug)]
pub struct ManagerCommands {
    /// Executable name
    pub program: &'static str,
    /// Lockfiles that identify this manager, most specific first
    pub lockfiles: &'static [&'static str],
    /// Arguments for the outdated report
    pub outdated: &'static [&'static str],
    /// Format of the outdated report
    pub outdated_format: ReportFormat,
    /// Arguments for an install simulation that leaves node_modules alone
    pub dry_run_install: &'static [&'static str],
    /// Arguments for listing the installed tree, if the manager has one
    pub list_tree: Option<&'static [&'static str]>,
    /// Subcommand used to move a single package to a new version
    pub upgrade: &'static str,
    /// Flag that turns an upgrade into a simulation
    pub dry_run_flag: &'static str,
}

const NPM: ManagerCommands = ManagerCommands {
    program: "npm",
    lockfiles: &["package-lock.json"],
    outdated: &["outdated", "--json"],
    outdated_format: ReportFormat::Json,
    dry_run_install: &["install", "--dry-run"],
    list_tree: Some(&["ls"]),
    upgrade: "install",
    dry_run_flag: "--dry-run",
};

const YARN: ManagerCommands = ManagerCommands {
    program: "yarn",
    lockfiles: &["yarn.lock"],
    outdated: &["outdated", "--json"],
    outdated_format: ReportFormat::Json,
    dry_run_install: &["install", "--mode=skip-build"],
    list_tree: Some(&["list"]),
    upgrade: "upgrade",
    dry_run_flag: "--dry-run",
};

const PNPM: ManagerCommands = ManagerCommands {
    program: "pnpm",
    lockfiles: &["pnpm-lock.yaml"],
    outdated: &["outdated", "--json"],
    outdated_format: ReportFormat::Json,
    dry_run_install: &["install", "--frozen-lockfile"],
    list_tree: Some(&["list"]),
    upgrade: "update",
    dry_run_flag: "--dry-run",
};

const BUN: ManagerCommands = ManagerCommands {
    program: "bun",
    lockfiles: &["bun.lockb", "bun.lock"],
    outdated: &["outdated"],
    outdated_format: ReportFormat::Text,
    dry_run_install: &["install", "--dry-run"],
    list_tree: None,
    upgrade: "update",
    dry_run_flag: "--dry-run",
};

impl PackageManager {
    /// Managers in lockfile detection priority order
    pub fn detection_order() -> &'static [PackageManager] {
        &[
            PackageManager::Bun,
            PackageManager::Pnpm,
            PackageManager::Yarn,
            PackageManager::Npm,
        ]
    }

    /// Returns the command table for this manager
    pub fn commands(&self) -> &'static ManagerCommands {
        match self {
            PackageManager::Npm => &NPM,
            PackageManager::Yarn => &YARN,
            PackageManager::Pnpm => &PNPM,
            PackageManager::Bun => &BUN,
        }
    }

    /// Returns the executable name
    pub fn program(&self) -> &'static str {
        self.commands().program
    }

    /// Returns the lockfile names for this manager
    pub fn lockfiles(&self) -> &'static [&'static str] {
        self.commands().lockfiles
    }

    /// Build the argument list for upgrading `name` to `target`
    pub fn upgrade_args(&self, name: &str, target: &str, dry_run: bool) -> Vec<String> {
        let commands = self.commands();
        let mut args = vec![commands.upgrade.to_string(), format!("{}@{}", name, target)];
        if dry_run {
            args.push(commands.dry_run_flag.to_string());
        }
        args
    }

    /// Returns the display name for this manager
    pub fn display_name(&self) -> &'static str {
        self.program()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
