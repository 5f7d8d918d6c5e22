//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading or parsing package.json
//! - ProcessError: Issues running package manager subcommands
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with CLI configuration
//! - OutdatedError: The outdated report could not be obtained
//! - PlanError: An upgrade plan was rejected before running

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Subprocess related errors
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to reading package.json
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("package.json not found in {}", dir.display())]
    NotFound { dir: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },
}

/// Errors related to running package manager commands
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish in time
    #[error("'{command}' timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The program exited unsuccessfully
    #[error("'{command}' failed with {}: {}", describe_exit(*code), output.trim())]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid path
    #[error("invalid path '{}': {message}", path.display())]
    InvalidPath { path: PathBuf, message: String },

    /// Invalid registry URL
    #[error("invalid registry URL '{value}': expected an http(s) URL")]
    InvalidRegistry { value: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

/// Errors that make the outdated report unavailable
#[derive(Error, Debug)]
pub enum OutdatedError {
    /// The outdated command could not be run or failed without usable output
    #[error("outdated check failed: {0}")]
    Command(#[from] ProcessError),

    /// The command ran but its output could not be understood
    #[error("could not parse {manager} outdated output: {message}")]
    Parse { manager: String, message: String },
}

/// Reasons an upgrade plan is rejected before any command runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Upgrading to latest may cross a major version
    #[error("upgrading to latest is disabled in safe mode; use --no-safe-mode to allow it")]
    LatestBlockedBySafeMode,

    /// No package is marked or selected
    #[error("no packages selected for upgrade")]
    NothingSelected,
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(dir: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { dir: dir.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ProcessError {
    /// Creates a new Spawn error
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        ProcessError::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(command: impl Into<String>, timeout: Duration) -> Self {
        ProcessError::Timeout {
            command: command.into(),
            timeout,
        }
    }

    /// Creates a new NonZeroExit error
    pub fn non_zero_exit(
        command: impl Into<String>,
        code: Option<i32>,
        output: impl Into<String>,
    ) -> Self {
        ProcessError::NonZeroExit {
            command: command.into(),
            code,
            output: output.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Returns true when the registry reported the package as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::PackageNotFound { .. })
    }
}

impl OutdatedError {
    /// Creates a new Parse error
    pub fn parse(manager: impl Into<String>, message: impl Into<String>) -> Self {
        OutdatedError::Parse {
            manager: manager.into(),
            message: message.into(),
        }
    }
}
