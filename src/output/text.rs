//! Text output formatter for human-readable display
//!
//! This module provides:
//! - The dependency list with outdated versions and update class colors
//! - Batch marks, filter state and the "unknown" outdated state
//! - Conflict listing with severity
//! - Package metadata and upgrade results
//! - A one-line summary

use crate::dashboard::SnapshotSummary;
use crate::domain::{
    Conflict, Dependency, OutdatedEntry, OutdatedReport, PackageMetadata, Severity, UpdateClass,
    UpgradeResult, UpgradeStatus,
};
use crate::output::{MetadataLookup, OutputFormatter, Report, UpgradeReport, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Minimum width of the name column
const NAME_WIDTH: usize = 20;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn class_label(&self, class: UpdateClass) -> String {
        if !self.color {
            return class.label().to_string();
        }
        match class {
            UpdateClass::Major => class.label().red().bold().to_string(),
            UpdateClass::Minor => class.label().yellow().to_string(),
            UpdateClass::Patch => class.label().green().to_string(),
        }
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = severity.to_string();
        if !self.color {
            return label;
        }
        match severity {
            Severity::Warning => label.yellow().to_string(),
            Severity::Error => label.red().bold().to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Version column of a dependency line
    fn version_status(&self, entry: Option<&OutdatedEntry>, unknown: bool) -> String {
        match entry {
            Some(entry) => {
                let arrow = if self.color { "→" } else { "->" };
                let latest = if entry.latest != entry.wanted {
                    format!(" (latest {})", entry.latest)
                } else {
                    String::new()
                };
                format!(
                    "{} {} {}{} [{}]",
                    self.dim(entry.installed().unwrap_or("-")),
                    arrow,
                    entry.wanted,
                    latest,
                    self.class_label(entry.update_class)
                )
            }
            None if unknown => self.dim("?"),
            None => self.dim("up to date"),
        }
    }

    fn format_dependency_line(
        &self,
        report: &Report<'_>,
        dependency: &Dependency,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let snapshot = report.snapshot;
        let mark = if report.state.is_marked(&dependency.name) {
            "[x]"
        } else {
            "[ ]"
        };
        let status = self.version_status(
            snapshot.outdated_entry(&dependency.name),
            snapshot.outdated.is_unavailable(),
        );
        let dev = if dependency.is_dev() {
            format!(" {}", self.dim("(dev)"))
        } else {
            String::new()
        };
        let conflicts = snapshot.conflicts_for(&dependency.name).count();
        let conflict_note = match conflicts {
            0 => String::new(),
            n if self.color => format!(" {}", format!("⚠ {}", n).yellow()),
            n => format!(" !{}", n),
        };

        writeln!(
            writer,
            "  {} {:width$} {:12} {}{}{}",
            mark,
            dependency.name,
            dependency.current_version_spec,
            status,
            dev,
            conflict_note,
            width = width
        )
    }

    fn format_conflicts(
        &self,
        conflicts: &[Conflict],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if conflicts.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}:", self.heading("Conflicts"))?;
        for conflict in conflicts {
            writeln!(
                writer,
                "  [{}] {}: {}",
                self.severity_label(conflict.severity),
                conflict.package,
                conflict.reason
            )?;
        }
        writeln!(writer)
    }

    fn format_dashboard(
        &self,
        report: &Report<'_>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let snapshot = report.snapshot;
        let state = report.state;

        writeln!(
            writer,
            "{} {}",
            self.heading(&format!("{} project", snapshot.manager)),
            self.dim(&snapshot.project_dir.display().to_string())
        )?;

        let visible = state.visible(snapshot);
        if !state.filter.query.is_empty() {
            writeln!(
                writer,
                "Filter '{}': {} of {} dependencies",
                state.filter.query,
                visible.len(),
                snapshot.dependencies.len()
            )?;
        }
        if let OutdatedReport::Unavailable { reason } = &snapshot.outdated {
            let line = format!("Outdated status unknown: {}", reason);
            if self.color {
                writeln!(writer, "{}", line.yellow())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }
        writeln!(writer)?;

        if visible.is_empty() {
            writeln!(writer, "  {}", self.dim("No dependencies"))?;
        }
        let width = visible
            .iter()
            .map(|d| d.name.len())
            .max()
            .unwrap_or(0)
            .max(NAME_WIDTH);
        for dependency in &visible {
            self.format_dependency_line(report, dependency, width, writer)?;
        }
        writeln!(writer)?;

        self.format_conflicts(&snapshot.conflicts, writer)
    }

    fn result_marker(&self, result: &UpgradeResult) -> String {
        match (result.status, self.color) {
            (UpgradeStatus::Applied | UpgradeStatus::Simulated, true) => "✓".green().to_string(),
            (UpgradeStatus::Blocked, true) => "⊘".yellow().to_string(),
            (UpgradeStatus::Failed, true) => "✗".red().to_string(),
            (UpgradeStatus::Applied | UpgradeStatus::Simulated, false) => "ok".to_string(),
            (UpgradeStatus::Blocked, false) => "blocked".to_string(),
            (UpgradeStatus::Failed, false) => "failed".to_string(),
        }
    }

    fn format_upgrade(
        &self,
        upgrade: &UpgradeReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let mut title = String::from("Upgrade");
        if upgrade.options.dry_run {
            title.push_str(" (dry-run)");
        }
        if !upgrade.options.safe_mode {
            title.push_str(" (safe mode off)");
        }
        writeln!(writer, "{}:", self.heading(&title))?;

        for result in &upgrade.results {
            writeln!(writer, "  {} {}", self.result_marker(result), result.message)?;
            if self.verbosity == Verbosity::Verbose && result.status == UpgradeStatus::Failed {
                for line in result.raw_output.iter().flat_map(|output| output.lines()) {
                    writeln!(writer, "      {}", self.dim(line))?;
                }
            }
        }
        if upgrade.refreshed {
            writeln!(writer, "  {}", self.dim("Dependencies reloaded"))?;
        }
        writeln!(writer)
    }

    fn format_package_metadata(
        &self,
        metadata: &PackageMetadata,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let version = metadata.version.as_deref().unwrap_or("?");
        writeln!(writer, "{} {}", self.heading(&metadata.name), version)?;

        if let Some(description) = &metadata.description {
            writeln!(writer, "  {}", description)?;
        }
        let mut field = |label: &str, value: Option<String>| -> std::io::Result<()> {
            match value {
                Some(value) => writeln!(writer, "  {:12} {}", self.dim(label), value),
                None => Ok(()),
            }
        };
        field("license", metadata.license.clone())?;
        field("author", metadata.author_display().map(str::to_string))?;
        field("homepage", metadata.homepage.clone())?;
        field("repository", metadata.repository_url().map(str::to_string))?;
        field(
            "maintainers",
            metadata
                .maintainers
                .as_ref()
                .filter(|m| !m.is_empty())
                .map(|m| m.iter().map(|m| m.name.as_str()).collect::<Vec<_>>().join(", ")),
        )?;
        field(
            "keywords",
            metadata
                .keywords
                .as_ref()
                .filter(|k| !k.is_empty())
                .map(|k| k.join(", ")),
        )?;
        field(
            "versions",
            metadata
                .versions
                .as_ref()
                .map(|_| metadata.version_count().to_string()),
        )?;
        if self.verbosity == Verbosity::Verbose {
            if let Some(tags) = &metadata.dist_tags {
                let tags: Vec<String> = tags
                    .iter()
                    .map(|(tag, version)| format!("{}={}", tag, version))
                    .collect();
                field("dist-tags", Some(tags.join(", ")))?;
            }
        }
        if let Some(time) = &metadata.time {
            field(
                "created",
                time.created.map(|d| d.format("%Y/%m/%d").to_string()),
            )?;
            field(
                "modified",
                time.modified.map(|d| d.format("%Y/%m/%d").to_string()),
            )?;
        }
        Ok(())
    }

    fn colored_summary(&self, summary: &SnapshotSummary) -> String {
        let outdated = match summary.outdated {
            Some(counts) => format!(
                "{} outdated ({} major, {} minor, {} patch)",
                counts.total().to_string().bold(),
                counts.major.to_string().red(),
                counts.minor.to_string().yellow(),
                counts.patch.to_string().green()
            ),
            None => "outdated unknown".yellow().to_string(),
        };
        let conflicts = if summary.conflict_errors > 0 {
            summary.conflicts.to_string().red().to_string()
        } else {
            summary.conflicts.to_string()
        };
        format!(
            "{}: {} dependencies ({} dev), {}, {} conflicts",
            summary.manager, summary.dependencies, summary.dev_dependencies, outdated, conflicts
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&report.summary(), writer);
        }

        self.format_dashboard(report, writer)?;

        for lookup in &report.metadata {
            self.format_metadata(lookup, writer)?;
            writeln!(writer)?;
        }

        if let Some(upgrade) = &report.upgrade {
            self.format_upgrade(upgrade, writer)?;
        }

        if !report.state.marked.is_empty() && report.upgrade.is_none() {
            let marked: Vec<&str> = report.state.marked.iter().map(String::as_str).collect();
            writeln!(writer, "Marked: {}", marked.join(", "))?;
        }

        self.format_summary(&report.summary(), writer)
    }

    fn format_summary(
        &self,
        summary: &SnapshotSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", self.colored_summary(summary))
        } else {
            writeln!(writer, "{}", summary)
        }
    }

    fn format_metadata(
        &self,
        lookup: &MetadataLookup,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match &lookup.metadata {
            Some(metadata) => self.format_package_metadata(metadata, writer),
            None => writeln!(
                writer,
                "{}: {}",
                self.heading(&lookup.name),
                self.dim("no metadata available")
            ),
        }
    }
}
