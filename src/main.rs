//! depdash - Dependency dashboard CLI for npm, yarn, pnpm and bun projects
//!
//! Loads a snapshot of the project's dependencies, optionally shows registry
//! metadata and runs upgrades, then prints the dashboard.

use clap::Parser;
use depdash::cli::{CliArgs, Settings};
use depdash::dashboard::DashboardState;
use depdash::error::PlanError;
use depdash::metadata::MetadataCache;
use depdash::orchestrator::Orchestrator;
use depdash::output::{create_formatter, MetadataLookup, Report, UpgradeReport};
use depdash::process::SystemProcessRunner;
use depdash::registry::{HttpClient, MetadataSource, NpmRegistry};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit code when an upgrade failed or was blocked
const EXIT_UPGRADE_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = args.settings()?;
    init_tracing(&settings);

    if args.verbose {
        eprintln!("depdash v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", settings.project_dir.display());
        if settings.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let runner = Arc::new(SystemProcessRunner::new().with_timeout(settings.timeout));
    let orchestrator = Orchestrator::new(runner, &settings.project_dir)
        .with_progress(settings.output.allows_progress());
    let mut snapshot = orchestrator.load().await?;

    let mut state = DashboardState::new();
    state.safe_mode = settings.safe_mode;
    if let Some(filter) = &settings.filter {
        state.apply_filter(filter);
    }

    let metadata = lookup_metadata(&settings, &mut state).await?;

    let mut exit_code = ExitCode::SUCCESS;
    let mut plan_error = None;
    let mut upgrade = None;

    if settings.wants_upgrade() {
        for name in &settings.upgrade {
            if !state.mark(&snapshot, name) {
                tracing::warn!(package = %name, "not a declared dependency, skipping");
            }
        }
        if settings.upgrade_all {
            state.mark_all_outdated(&snapshot);
        }

        let plan = if state.marked.is_empty() {
            Err(PlanError::NothingSelected)
        } else {
            state.plan(&snapshot, settings.class, settings.dry_run)
        };

        match plan {
            Ok(actions) => {
                let options = state.options(settings.dry_run);
                state.begin_upgrade();
                let outcome = orchestrator.apply(&snapshot, &actions, options).await;
                state.finish_upgrade();

                if !outcome.all_succeeded() {
                    exit_code = ExitCode::from(EXIT_UPGRADE_FAILED);
                }
                let refreshed = outcome.refreshed.is_some();
                if let Some(reloaded) = outcome.refreshed {
                    snapshot = reloaded;
                    state.clamp_selection(&snapshot);
                }
                upgrade = Some(UpgradeReport {
                    options,
                    results: outcome.results,
                    refreshed,
                });
            }
            Err(e) => plan_error = Some(e),
        }
    }

    // Output results
    let formatter = create_formatter(settings.output);
    let mut report = Report::new(&snapshot, &state);
    report.metadata = metadata;
    report.upgrade = upgrade;

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if let Some(e) = plan_error {
        eprintln!("Error: {}", e);
        return Ok(ExitCode::FAILURE);
    }
    Ok(exit_code)
}

/// Fetch metadata for every `--info` package concurrently.
///
/// Ctrl-C abandons the fetches; the affected packages are reported without metadata.
async fn lookup_metadata(
    settings: &Settings,
    state: &mut DashboardState,
) -> anyhow::Result<Vec<MetadataLookup>> {
    if settings.info.is_empty() {
        return Ok(Vec::new());
    }

    let registry = NpmRegistry::with_base_url(HttpClient::new()?, &settings.registry_url);
    let cache = MetadataCache::new(Arc::new(registry) as Arc<dyn MetadataSource>);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    for name in &settings.info {
        state.begin_metadata(name);
    }
    let fetched = futures::future::join_all(
        settings
            .info
            .iter()
            .map(|name| cache.fetch(name, Some(&cancel))),
    )
    .await;
    interrupt.abort();

    let lookups = settings
        .info
        .iter()
        .zip(fetched)
        .map(|(name, metadata)| {
            state.end_metadata(name);
            MetadataLookup {
                name: name.clone(),
                metadata,
            }
        })
        .collect();
    Ok(lookups)
}
