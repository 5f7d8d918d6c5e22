//! Dashboard session state
//!
//! This module provides:
//! - Selection, filter, batch marks and dialog state
//! - Turning the current selection into an upgrade plan
//! - Summary counts for a snapshot

mod state;
mod summary;

pub use state::{DashboardState, DialogChoice, DialogState, FilterState};
pub use summary::{OutdatedCounts, SnapshotSummary};
