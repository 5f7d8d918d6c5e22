//! End-to-end tests for the depdash CLI
//!
//! These tests verify:
//! - Argument validation and its error messages
//! - JSON and text output when package manager commands are unavailable
//! - Exit codes for rejected plans and failed upgrades
//! - A full load and upgrade against a scripted `npm` (unix only)

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Command for the compiled binary with a PATH that contains no package managers
fn depdash(path_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_depdash"));
    cmd.env("PATH", path_dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DEPDASH_REGISTRY");
    cmd
}

/// Create a project with an npm lockfile
fn create_test_project() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let package_json = r#"{
  "name": "test-project",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.20"
  },
  "devDependencies": {
    "typescript": "~5.0.0"
  }
}"#;
    fs::write(temp_dir.path().join("package.json"), package_json).unwrap();
    fs::write(temp_dir.path().join("package-lock.json"), "{}").unwrap();
    temp_dir
}

fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Output should be valid JSON")
}

mod arguments {
    use super::*;

    #[test]
    fn test_help() {
        let bin = tempfile::tempdir().unwrap();
        depdash(&bin)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Dependency dashboard"))
            .stdout(predicate::str::contains("--no-safe-mode"));
    }

    #[test]
    fn test_version() {
        let bin = tempfile::tempdir().unwrap();
        depdash(&bin)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_missing_directory() {
        let bin = tempfile::tempdir().unwrap();
        depdash(&bin)
            .arg("/definitely/not/a/project")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid path"));
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        depdash(&bin)
            .arg(project.path())
            .args(["--quiet", "--verbose"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("conflicting options"));
    }

    #[test]
    fn test_invalid_class() {
        let bin = tempfile::tempdir().unwrap();
        depdash(&bin)
            .args(["--class", "newest"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("newest"));
    }

    #[test]
    fn test_invalid_registry() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        depdash(&bin)
            .arg(project.path())
            .args(["--registry", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid registry URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        let bin = tempfile::tempdir().unwrap();
        depdash(&bin)
            .args(["--timeout", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("greater than zero"));
    }
}

mod without_package_manager {
    use super::*;

    #[test]
    fn test_missing_manifest() {
        let bin = tempfile::tempdir().unwrap();
        let empty = tempfile::tempdir().unwrap();
        depdash(&bin)
            .arg(empty.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("package.json not found"));
    }

    #[test]
    fn test_json_reports_unknown_outdated_state() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        let output = depdash(&bin)
            .arg(project.path())
            .arg("--json")
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = parse_json(&output.stdout);
        assert_eq!(json["manager"], "npm");
        assert!(json["outdated_error"].is_string());
        assert!(json["summary"]["outdated"].is_null());
        assert_eq!(json["summary"]["dependencies"], 2);
        assert_eq!(json["dependencies"][1]["kind"], "devDependency");
        assert!(json["conflicts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_text_output() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        depdash(&bin)
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("lodash"))
            .stdout(predicate::str::contains("Outdated status unknown"));
    }

    #[test]
    fn test_quiet_output_is_summary_line() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        let output = depdash(&bin)
            .arg(project.path())
            .arg("--quiet")
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.lines().count(), 1);
        assert!(stdout.starts_with("npm: 2 dependencies (1 dev)"));
    }

    #[test]
    fn test_upgrade_of_up_to_date_package_is_rejected() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        depdash(&bin)
            .arg(project.path())
            .args(["--upgrade", "lodash"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no packages selected"));
    }

    #[test]
    fn test_latest_in_safe_mode_is_rejected() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        depdash(&bin)
            .arg(project.path())
            .args(["--upgrade", "lodash", "--class", "latest"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("disabled in safe mode"));
    }

    #[test]
    fn test_failed_dry_run_exit_code() {
        let bin = tempfile::tempdir().unwrap();
        let project = create_test_project();
        let output = depdash(&bin)
            .arg(project.path())
            .args(["--json", "--dry-run", "--upgrade", "lodash"])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(2));
        let json = parse_json(&output.stdout);
        let upgrade = &json["upgrade"];
        assert_eq!(upgrade["dry_run"], true);
        assert_eq!(upgrade["refreshed"], false);
        assert_eq!(upgrade["results"][0]["name"], "lodash");
        assert_eq!(upgrade["results"][0]["status"], "failed");
    }
}

#[cfg(unix)]
mod scripted_npm {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_NPM: &str = r#"#!/bin/sh
if [ "$1" = "outdated" ]; then
  echo '{"lodash": {"current": "4.17.20", "wanted": "4.17.21", "latest": "4.17.21"}}'
  exit 1
fi
echo "npm $*"
exit 0
"#;

    /// PATH directory holding an executable `npm` script
    fn fake_npm() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("npm");
        fs::write(&script, FAKE_NPM).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        dir
    }

    #[test]
    fn test_outdated_report() {
        let bin = fake_npm();
        let project = create_test_project();
        let output = depdash(&bin)
            .arg(project.path())
            .arg("--json")
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = parse_json(&output.stdout);
        assert!(json.get("outdated_error").is_none());
        assert_eq!(json["summary"]["outdated"]["patch"], 1);
        let lodash = &json["dependencies"][0];
        assert_eq!(lodash["name"], "lodash");
        assert_eq!(lodash["outdated"]["wanted"], "4.17.21");
        assert_eq!(lodash["outdated"]["update_class"], "patch");
    }

    #[test]
    fn test_text_row() {
        let bin = fake_npm();
        let project = create_test_project();
        depdash(&bin)
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("4.17.20 -> 4.17.21"))
            .stdout(predicate::str::contains("[patch]"));
    }

    #[test]
    fn test_upgrade_reloads_snapshot() {
        let bin = fake_npm();
        let project = create_test_project();
        let output = depdash(&bin)
            .arg(project.path())
            .args(["--json", "--upgrade", "lodash"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = parse_json(&output.stdout);
        let upgrade = &json["upgrade"];
        assert_eq!(upgrade["safe_mode"], true);
        assert_eq!(upgrade["refreshed"], true);
        assert_eq!(upgrade["results"][0]["status"], "applied");
        assert_eq!(
            upgrade["results"][0]["message"],
            "Successfully upgraded lodash to 4.17.21"
        );
    }

    #[test]
    fn test_filter() {
        let bin = fake_npm();
        let project = create_test_project();
        let output = depdash(&bin)
            .arg(project.path())
            .args(["--json", "--filter", "type"])
            .output()
            .unwrap();

        let json = parse_json(&output.stdout);
        assert_eq!(json["filter"], "type");
        let dependencies = json["dependencies"].as_array().unwrap();
        assert_eq!(dependencies.len(), 1);
        assert_eq!(dependencies[0]["name"], "typescript");
    }
}
