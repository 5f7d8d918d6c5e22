//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the snapshot view and its summary
//! - Metadata lookups and upgrade results in the same document

use crate::dashboard::SnapshotSummary;
use crate::domain::{
    Conflict, DependencyKind, OutdatedEntry, OutdatedReport, PackageManager, PackageMetadata,
    UpgradeResult,
};
use crate::output::{MetadataLookup, OutputFormatter, Report, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of a full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    manager: PackageManager,
    project_dir: String,
    summary: SnapshotSummary,
    /// Present only when the outdated report could not be obtained
    #[serde(skip_serializing_if = "Option::is_none")]
    outdated_error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    dependencies: Vec<JsonDependency<'a>>,
    conflicts: &'a [Conflict],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    metadata: Vec<JsonMetadata<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upgrade: Option<JsonUpgrade<'a>>,
}

/// JSON representation of one dependency row
#[derive(Serialize)]
struct JsonDependency<'a> {
    name: &'a str,
    spec: &'a str,
    kind: DependencyKind,
    marked: bool,
    /// `null` when up to date or when the outdated state is unknown
    outdated: Option<&'a OutdatedEntry>,
}

/// JSON representation of a metadata lookup
#[derive(Serialize)]
struct JsonMetadata<'a> {
    name: &'a str,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a PackageMetadata>,
}

/// JSON representation of an upgrade run
#[derive(Serialize)]
struct JsonUpgrade<'a> {
    dry_run: bool,
    safe_mode: bool,
    refreshed: bool,
    succeeded: usize,
    unsuccessful: usize,
    results: Vec<JsonUpgradeResult<'a>>,
}

/// JSON representation of an upgrade result
#[derive(Serialize)]
struct JsonUpgradeResult<'a> {
    #[serde(flatten)]
    result: &'a UpgradeResult,
    success: bool,
}

impl JsonFormatter {
    fn metadata_to_json<'a>(&self, lookup: &'a MetadataLookup) -> JsonMetadata<'a> {
        JsonMetadata {
            name: &lookup.name,
            found: lookup.metadata.is_some(),
            metadata: lookup.metadata.as_deref(),
        }
    }

    fn write_json<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        let snapshot = report.snapshot;
        let state = report.state;

        let dependencies = if self.verbosity == Verbosity::Quiet {
            Vec::new()
        } else {
            state
                .visible(snapshot)
                .into_iter()
                .map(|dependency| JsonDependency {
                    name: &dependency.name,
                    spec: &dependency.current_version_spec,
                    kind: dependency.kind,
                    marked: state.is_marked(&dependency.name),
                    outdated: snapshot.outdated_entry(&dependency.name),
                })
                .collect()
        };

        let upgrade = report.upgrade.as_ref().map(|upgrade| JsonUpgrade {
            dry_run: upgrade.options.dry_run,
            safe_mode: upgrade.options.safe_mode,
            refreshed: upgrade.refreshed,
            succeeded: upgrade.succeeded(),
            unsuccessful: upgrade.unsuccessful(),
            results: upgrade
                .results
                .iter()
                .map(|result| JsonUpgradeResult {
                    result,
                    success: result.success(),
                })
                .collect(),
        });

        let outdated_error = match &snapshot.outdated {
            OutdatedReport::Unavailable { reason } => Some(reason.as_str()),
            OutdatedReport::Available { .. } => None,
        };
        let conflicts: &[Conflict] = if self.verbosity == Verbosity::Quiet {
            &[]
        } else {
            &snapshot.conflicts
        };

        let output = JsonOutput {
            manager: snapshot.manager,
            project_dir: snapshot.project_dir.display().to_string(),
            summary: report.summary(),
            outdated_error,
            filter: Some(state.filter.query.as_str()).filter(|q| !q.is_empty()),
            dependencies,
            conflicts,
            metadata: report
                .metadata
                .iter()
                .map(|lookup| self.metadata_to_json(lookup))
                .collect(),
            upgrade,
        };

        self.write_json(&output, writer)
    }

    fn format_summary(
        &self,
        summary: &SnapshotSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(summary, writer)
    }

    fn format_metadata(
        &self,
        lookup: &MetadataLookup,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(&self.metadata_to_json(lookup), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardState;
    use crate::domain::{UpgradeAction, UpgradeClass, UpgradeOptions};
    use crate::output::{fixtures, UpgradeReport};
    use serde_json::Value;
    use std::sync::Arc;

    fn render(formatter: &JsonFormatter, report: &Report<'_>) -> Value {
        let mut output = Vec::new();
        formatter.format(report, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_format_json() {
        let snapshot = fixtures::snapshot();
        let mut state = DashboardState::new();
        state.toggle_mark("lodash");
        let json = render(
            &JsonFormatter::new(Verbosity::Normal),
            &Report::new(&snapshot, &state),
        );

        assert_eq!(json["manager"], "npm");
        assert_eq!(json["summary"]["outdated"]["major"], 1);
        assert!(json.get("outdated_error").is_none());
        assert!(json.get("upgrade").is_none());

        let dependencies = json["dependencies"].as_array().unwrap();
        assert_eq!(dependencies.len(), 4);
        assert_eq!(dependencies[0]["name"], "react");
        assert_eq!(dependencies[0]["outdated"]["update_class"], "major");
        assert_eq!(dependencies[1]["marked"], true);
        assert!(dependencies[2]["outdated"].is_null());
        assert_eq!(dependencies[3]["kind"], "devDependency");
        assert_eq!(json["conflicts"][0]["severity"], "warning");
    }

    #[test]
    fn test_format_json_unknown_outdated() {
        let snapshot = fixtures::unavailable();
        let state = DashboardState::new();
        let json = render(
            &JsonFormatter::new(Verbosity::Normal),
            &Report::new(&snapshot, &state),
        );

        assert!(json["summary"]["outdated"].is_null());
        assert_eq!(
            json["outdated_error"],
            "failed to run 'npm outdated --json'"
        );
    }

    #[test]
    fn test_format_json_filter() {
        let snapshot = fixtures::snapshot();
        let mut state = DashboardState::new();
        state.apply_filter("re");
        let json = render(
            &JsonFormatter::new(Verbosity::Normal),
            &Report::new(&snapshot, &state),
        );

        assert_eq!(json["filter"], "re");
        let names: Vec<&str> = json["dependencies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["react", "express"]);
    }

    #[test]
    fn test_format_json_quiet() {
        let snapshot = fixtures::snapshot();
        let state = DashboardState::new();
        let json = render(
            &JsonFormatter::new(Verbosity::Quiet),
            &Report::new(&snapshot, &state),
        );

        assert!(json["dependencies"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["dependencies"], 4);
    }

    #[test]
    fn test_format_json_upgrade_and_metadata() {
        let snapshot = fixtures::snapshot();
        let state = DashboardState::new();
        let lodash = UpgradeAction::new("lodash", "^4.17.20", "4.17.21", UpgradeClass::Wanted);
        let mut report = Report::new(&snapshot, &state);
        report.upgrade = Some(UpgradeReport {
            options: UpgradeOptions::default(),
            results: vec![UpgradeResult::applied(&lodash, "changed 1 package")],
            refreshed: true,
        });
        report.metadata = vec![
            MetadataLookup {
                name: "lodash".to_string(),
                metadata: Some(Arc::new(PackageMetadata::new("lodash"))),
            },
            MetadataLookup {
                name: "ghost".to_string(),
                metadata: None,
            },
        ];

        let json = render(&JsonFormatter::new(Verbosity::Normal), &report);
        let upgrade = &json["upgrade"];
        assert_eq!(upgrade["safe_mode"], true);
        assert_eq!(upgrade["refreshed"], true);
        assert_eq!(upgrade["succeeded"], 1);
        assert_eq!(upgrade["results"][0]["status"], "applied");
        assert_eq!(upgrade["results"][0]["success"], true);
        assert_eq!(upgrade["results"][0]["name"], "lodash");

        assert_eq!(json["metadata"][0]["found"], true);
        assert_eq!(json["metadata"][0]["metadata"]["name"], "lodash");
        assert_eq!(json["metadata"][1]["found"], false);
        assert!(json["metadata"][1].get("metadata").is_none());
    }

    #[test]
    fn test_format_summary() {
        let snapshot = fixtures::snapshot();
        let formatter = JsonFormatter::new(Verbosity::Normal);
        let mut output = Vec::new();
        formatter
            .format_summary(&SnapshotSummary::from_snapshot(&snapshot), &mut output)
            .unwrap();
        let json: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["conflicts"], 1);
        assert_eq!(json["manager"], "npm");
    }
}
