//! Output formatting for dashboard reports
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::dashboard::{DashboardState, SnapshotSummary};
use crate::domain::{PackageMetadata, Snapshot, UpgradeOptions, UpgradeResult};
use std::io::{IsTerminal, Write};
use std::sync::Arc;

/// Colors only for a terminal, and never when `NO_COLOR` is set
fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Summary line only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Detailed output with additional information
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, verbosity: Verbosity) -> Self {
        Self {
            format,
            verbosity,
            color: true,
        }
    }

    /// Create configuration from CLI flags
    pub fn from_cli(json: bool, verbose: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            color: color_enabled(),
            ..Self::new(format, verbosity)
        }
    }

    /// Whether a progress spinner may be drawn alongside this output
    pub fn allows_progress(&self) -> bool {
        self.format == OutputFormat::Text && self.verbosity != Verbosity::Quiet
    }
}

/// Metadata requested for one package
#[derive(Debug, Clone)]
pub struct MetadataLookup {
    /// Requested package name
    pub name: String,
    /// Fetched metadata, `None` when unavailable
    pub metadata: Option<Arc<PackageMetadata>>,
}

/// Outcome of an upgrade run, as shown to the user
#[derive(Debug, Clone)]
pub struct UpgradeReport {
    /// Options the batch ran with
    pub options: UpgradeOptions,
    /// Results in submission order
    pub results: Vec<UpgradeResult>,
    /// Whether the snapshot was reloaded afterwards
    pub refreshed: bool,
}

impl UpgradeReport {
    /// Number of successful results
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    /// Number of results that did not succeed
    pub fn unsuccessful(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Everything one run prints
pub struct Report<'a> {
    /// Current snapshot (the reloaded one after a persisted upgrade)
    pub snapshot: &'a Snapshot,
    /// Dashboard state providing the filter and marks
    pub state: &'a DashboardState,
    /// Metadata lookups, in request order
    pub metadata: Vec<MetadataLookup>,
    /// Upgrade outcome, if an upgrade ran
    pub upgrade: Option<UpgradeReport>,
}

impl<'a> Report<'a> {
    /// Create a report of the snapshot alone
    pub fn new(snapshot: &'a Snapshot, state: &'a DashboardState) -> Self {
        Self {
            snapshot,
            state,
            metadata: Vec::new(),
            upgrade: None,
        }
    }

    /// Summary counts for the snapshot
    pub fn summary(&self) -> SnapshotSummary {
        self.state.summary(self.snapshot)
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write a full report
    fn format(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write just the summary
    fn format_summary(
        &self,
        summary: &SnapshotSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format and write the metadata of a single package
    fn format_metadata(
        &self,
        lookup: &MetadataLookup,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.verbosity)),
    }
}
