//! CLI argument parsing module for depdash

use crate::domain::UpgradeClass;
use crate::error::ConfigError;
use crate::output::{OutputConfig, Verbosity};
use crate::registry::NPM_REGISTRY_URL;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Default limit for a single package manager command, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Parse a timeout in format: N (seconds), Ns (seconds), Nm (minutes)
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty timeout".to_string());
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else {
        (s, 1)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in timeout: {}", num_str))?;
    if num == 0 {
        return Err("timeout must be greater than zero".to_string());
    }

    num.checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("timeout too large: {}", s))
}

/// Dependency dashboard for npm, yarn, pnpm and bun projects
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depdash",
    version,
    about = "Dependency dashboard for npm, yarn, pnpm and bun projects"
)]
pub struct CliArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable quiet mode - summary line only
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output and debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Show only dependencies whose name contains this text
    #[arg(long, value_name = "QUERY")]
    pub filter: Option<String>,

    // Metadata
    /// Show registry metadata for a package (can be specified multiple times)
    #[arg(long, value_name = "NAME", action = ArgAction::Append)]
    pub info: Vec<String>,

    // Upgrade options
    /// Mark a package for upgrade (can be specified multiple times)
    #[arg(long, value_name = "NAME", action = ArgAction::Append)]
    pub upgrade: Vec<String>,

    /// Mark every outdated package for upgrade
    #[arg(long)]
    pub all: bool,

    /// Upgrade class: patch, minor, major, latest or wanted
    #[arg(long, default_value = "wanted", value_parser = clap::value_parser!(UpgradeClass))]
    pub class: UpgradeClass,

    /// Dry run mode - simulate upgrades without changing the project
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Allow major and latest upgrades
    #[arg(long)]
    pub no_safe_mode: bool,

    // Environment
    /// npm-compatible registry used for metadata
    #[arg(long, env = "DEPDASH_REGISTRY", default_value = NPM_REGISTRY_URL)]
    pub registry: String,

    /// Limit for each package manager command (e.g., 120, 90s, 5m)
    #[arg(long, value_name = "SECS", default_value = "120", value_parser = parse_timeout)]
    pub timeout: Duration,
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Project root
    pub project_dir: PathBuf,
    /// Registry base URL without a trailing slash
    pub registry_url: String,
    /// Limit for each package manager command
    pub timeout: Duration,
    /// Initial safe mode
    pub safe_mode: bool,
    /// Simulate upgrades
    pub dry_run: bool,
    /// Requested upgrade class
    pub class: UpgradeClass,
    pub filter: Option<String>,
    /// Packages to show metadata for
    pub info: Vec<String>,
    /// Packages to mark for upgrade
    pub upgrade: Vec<String>,
    /// Mark every outdated package
    pub upgrade_all: bool,
    pub output: OutputConfig,
}

impl CliArgs {
    /// Validate the arguments into [`Settings`]
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        if self.quiet && self.verbose {
            return Err(ConfigError::ConflictingOptions {
                message: "--quiet and --verbose cannot be used together".to_string(),
            });
        }
        if !self.path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: self.path.clone(),
                message: "not a directory".to_string(),
            });
        }

        Ok(Settings {
            project_dir: self.path.clone(),
            registry_url: validate_registry(&self.registry)?,
            timeout: self.timeout,
            safe_mode: !self.no_safe_mode,
            dry_run: self.dry_run,
            class: self.class,
            filter: self.filter.clone().filter(|f| !f.is_empty()),
            info: self.info.clone(),
            upgrade: self.upgrade.clone(),
            upgrade_all: self.all,
            output: OutputConfig::from_cli(self.json, self.verbose, self.quiet),
        })
    }
}

fn validate_registry(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match host {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => {
            Ok(trimmed.to_string())
        }
        _ => Err(ConfigError::InvalidRegistry {
            value: value.to_string(),
        }),
    }
}

impl Settings {
    /// Returns true if any upgrade was requested
    pub fn wants_upgrade(&self) -> bool {
        self.upgrade_all || !self.upgrade.is_empty()
    }

    /// Default log directive for the subscriber when `RUST_LOG` is unset
    pub fn log_directive(&self) -> &'static str {
        if self.output.verbosity == Verbosity::Verbose {
            "depdash=debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use clap::Parser;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["depdash"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_args() {
        let args = parse(&[]);
        assert_eq!(args.path, PathBuf::from("."));
        assert!(!args.json);
        assert!(!args.quiet);
        assert!(!args.verbose);
        assert!(args.filter.is_none());
        assert!(args.info.is_empty());
        assert!(args.upgrade.is_empty());
        assert!(!args.all);
        assert_eq!(args.class, UpgradeClass::Wanted);
        assert!(!args.dry_run);
        assert!(!args.no_safe_mode);
        assert_eq!(args.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_path_argument() {
        let args = parse(&["/some/path"]);
        assert_eq!(args.path, PathBuf::from("/some/path"));
    }

    #[test]
    fn test_dry_run_short_flag() {
        assert!(parse(&["-n"]).dry_run);
        assert!(parse(&["--dry-run"]).dry_run);
    }

    #[test]
    fn test_repeatable_package_options() {
        let args = parse(&[
            "--upgrade", "react", "--upgrade", "lodash", "--info", "react",
        ]);
        assert_eq!(args.upgrade, vec!["react", "lodash"]);
        assert_eq!(args.info, vec!["react"]);
    }

    #[test]
    fn test_class_option() {
        assert_eq!(parse(&["--class", "latest"]).class, UpgradeClass::Latest);
        assert_eq!(parse(&["--class", "PATCH"]).class, UpgradeClass::Patch);
        assert!(CliArgs::try_parse_from(["depdash", "--class", "newest"]).is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_timeout("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_timeout("2m"), Ok(Duration::from_secs(120)));
        assert!(parse_timeout("").is_err());
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_parse_timeout_overflow() {
        let err = parse_timeout("400000000000000000m").unwrap_err();
        assert!(err.contains("too large"));
        assert!(parse_timeout(&format!("{}s", u64::MAX)).is_ok());
    }

    #[test]
    fn test_registry_option() {
        let args = parse(&["--registry", "http://localhost:4873/"]);
        assert_eq!(args.registry, "http://localhost:4873/");
    }

    #[test]
    fn test_validate_registry() {
        assert_eq!(
            validate_registry("https://registry.npmjs.org/").unwrap(),
            "https://registry.npmjs.org"
        );
        assert!(validate_registry("http://localhost:4873").is_ok());
        assert!(validate_registry("registry.npmjs.org").is_err());
        assert!(validate_registry("https://").is_err());
        assert!(validate_registry("ftp://mirror").is_err());
    }

    #[test]
    fn test_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();
        let settings = parse(&[path, "--json", "--no-safe-mode", "--all", "--filter", "re"])
            .settings()
            .unwrap();

        assert!(!settings.safe_mode);
        assert!(settings.wants_upgrade());
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert_eq!(settings.filter.as_deref(), Some("re"));
        assert_eq!(settings.registry_url, NPM_REGISTRY_URL);
        assert_eq!(settings.log_directive(), "warn");
    }

    #[test]
    fn test_settings_without_upgrade() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = parse(&[dir.path().to_str().unwrap(), "--verbose"])
            .settings()
            .unwrap();
        assert!(!settings.wants_upgrade());
        assert!(settings.safe_mode);
        assert_eq!(settings.log_directive(), "depdash=debug");
    }

    #[test]
    fn test_settings_rejects_quiet_and_verbose() {
        let err = parse(&["--quiet", "--verbose"]).settings().unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingOptions { .. }));
    }

    #[test]
    fn test_settings_rejects_missing_directory() {
        let err = parse(&["/definitely/not/here"]).settings().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }

    #[test]
    fn test_settings_rejects_bad_registry() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = parse(&[dir.path().to_str().unwrap(), "--registry", "nope"])
            .settings()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegistry { .. }));
    }
}
