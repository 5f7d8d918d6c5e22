//! Selection, filtering and batch marks for the dependency list

use super::SnapshotSummary;
use crate::domain::{Dependency, Snapshot, UpgradeAction, UpgradeClass, UpgradeOptions};
use crate::error::PlanError;
use std::collections::{BTreeSet, HashSet};

/// Name filter over the dependency list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Whether the filter is being edited
    pub active: bool,
    /// Case-insensitive substring to match
    pub query: String,
}

impl FilterState {
    /// Returns true if `name` passes the filter
    pub fn matches(&self, name: &str) -> bool {
        self.query.is_empty() || name.to_lowercase().contains(&self.query.to_lowercase())
    }
}

/// Entries of the upgrade dialog, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    /// Upgrade to the wanted version
    Wanted,
    /// Upgrade to the latest version
    Latest,
    /// Simulate a wanted upgrade
    DryRun,
}

impl DialogChoice {
    const ALL: [DialogChoice; 3] = [
        DialogChoice::Wanted,
        DialogChoice::Latest,
        DialogChoice::DryRun,
    ];

    /// Requested class and whether the upgrade is simulated
    pub fn request(&self) -> (UpgradeClass, bool) {
        match self {
            DialogChoice::Wanted => (UpgradeClass::Wanted, false),
            DialogChoice::Latest => (UpgradeClass::Latest, false),
            DialogChoice::DryRun => (UpgradeClass::Wanted, true),
        }
    }
}

/// Upgrade dialog state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogState {
    pub open: bool,
    pub selected_index: usize,
    /// An upgrade started from the dialog is running
    pub upgrading: bool,
}

impl DialogState {
    /// The highlighted choice
    pub fn choice(&self) -> DialogChoice {
        DialogChoice::ALL[self.selected_index.min(DialogChoice::ALL.len() - 1)]
    }
}

/// UI-only state of one dashboard session.
///
/// Nothing here is read by the loading or upgrade code; a state is paired
/// with whichever snapshot is current and survives reloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    /// Index into the visible (filtered) list
    pub selected_index: usize,
    pub filter: FilterState,
    /// Packages marked for a batch upgrade
    pub marked: BTreeSet<String>,
    pub dialog: DialogState,
    /// Refuse major and latest upgrades
    pub safe_mode: bool,
    /// Packages whose metadata is being fetched
    pub metadata_loading: HashSet<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            selected_index: 0,
            filter: FilterState::default(),
            marked: BTreeSet::new(),
            dialog: DialogState::default(),
            safe_mode: true,
            metadata_loading: HashSet::new(),
        }
    }
}

impl DashboardState {
    /// Create a state with safe mode on
    pub fn new() -> Self {
        Self::default()
    }

    /// Dependencies that pass the filter, in manifest order
    pub fn visible<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a Dependency> {
        snapshot
            .dependencies
            .iter()
            .filter(|d| self.filter.matches(&d.name))
            .collect()
    }

    /// The highlighted dependency
    pub fn selected<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Dependency> {
        self.visible(snapshot).get(self.selected_index).copied()
    }

    /// Move the highlight one row up
    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Move the highlight one row down, stopping at the last visible row
    pub fn move_down(&mut self, snapshot: &Snapshot) {
        let last = self.visible(snapshot).len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(last);
    }

    /// Start editing a new filter
    pub fn start_filter(&mut self) {
        self.filter.active = true;
        self.filter.query.clear();
    }

    /// Append a character to the filter; returns false if it is not allowed
    pub fn push_filter_char(&mut self, c: char) -> bool {
        if !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@' | '/' | '.')) {
            return false;
        }
        self.filter.query.push(c);
        self.selected_index = 0;
        true
    }

    /// Remove the last filter character
    pub fn pop_filter_char(&mut self) {
        self.filter.query.pop();
        self.selected_index = 0;
    }

    /// Stop editing and keep the query
    pub fn commit_filter(&mut self) {
        self.filter.active = false;
    }

    /// Stop editing and drop the query
    pub fn clear_filter(&mut self) {
        self.filter = FilterState::default();
        self.selected_index = 0;
    }

    /// Replace the filter with `query`, dropping characters that are not allowed
    pub fn apply_filter(&mut self, query: &str) {
        self.start_filter();
        for c in query.chars() {
            if !self.push_filter_char(c) {
                tracing::debug!(%c, "ignoring filter character");
            }
        }
        self.commit_filter();
    }

    /// Mark or unmark a package
    pub fn toggle_mark(&mut self, name: &str) {
        if !self.marked.remove(name) {
            self.marked.insert(name.to_string());
        }
    }

    /// Mark a declared package; returns false if the snapshot does not declare it
    pub fn mark(&mut self, snapshot: &Snapshot, name: &str) -> bool {
        if snapshot.dependency(name).is_none() {
            return false;
        }
        self.marked.insert(name.to_string());
        true
    }

    /// Returns true if `name` is marked for a batch upgrade
    pub fn is_marked(&self, name: &str) -> bool {
        self.marked.contains(name)
    }

    /// Mark every package that has an update
    pub fn mark_all_outdated(&mut self, snapshot: &Snapshot) {
        self.marked
            .extend(snapshot.outdated.entries().iter().map(|e| e.name.clone()));
    }

    /// Unmark every package
    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    /// Turn safe mode on or off
    pub fn toggle_safe_mode(&mut self) {
        self.safe_mode = !self.safe_mode;
    }

    /// Open the upgrade dialog; editing of the filter ends and its query is dropped
    pub fn open_dialog(&mut self) {
        self.dialog.open = true;
        self.dialog.selected_index = 0;
        self.filter = FilterState::default();
    }

    /// Close the upgrade dialog
    pub fn close_dialog(&mut self) {
        self.dialog = DialogState::default();
    }

    /// Highlight the previous dialog entry
    pub fn dialog_up(&mut self) {
        self.dialog.selected_index = self.dialog.selected_index.saturating_sub(1);
    }

    /// Highlight the next dialog entry
    pub fn dialog_down(&mut self) {
        let last = DialogChoice::ALL.len() - 1;
        self.dialog.selected_index = (self.dialog.selected_index + 1).min(last);
    }

    /// Highlight a dialog entry directly
    pub fn select_choice(&mut self, choice: DialogChoice) {
        self.dialog.selected_index = DialogChoice::ALL
            .iter()
            .position(|c| *c == choice)
            .unwrap_or(0);
    }

    /// Upgrade options for the current safe mode
    pub fn options(&self, dry_run: bool) -> UpgradeOptions {
        UpgradeOptions {
            dry_run,
            safe_mode: self.safe_mode,
        }
    }

    /// Build the actions for an upgrade of `class`.
    ///
    /// Marked packages are planned in manifest order; with nothing marked
    /// the highlighted package is used. Packages without an update are
    /// skipped unless the upgrade is simulated.
    pub fn plan(
        &self,
        snapshot: &Snapshot,
        class: UpgradeClass,
        dry_run: bool,
    ) -> Result<Vec<UpgradeAction>, PlanError> {
        if class == UpgradeClass::Latest && self.safe_mode {
            return Err(PlanError::LatestBlockedBySafeMode);
        }

        let candidates: Vec<&Dependency> = if self.marked.is_empty() {
            self.selected(snapshot).into_iter().collect()
        } else {
            snapshot
                .dependencies
                .iter()
                .filter(|d| self.marked.contains(&d.name))
                .collect()
        };

        let actions: Vec<UpgradeAction> = candidates
            .into_iter()
            .filter_map(|dependency| {
                let entry = snapshot.outdated_entry(&dependency.name);
                if entry.is_none() && !dry_run {
                    return None;
                }
                Some(UpgradeAction::for_entry(dependency, entry, class))
            })
            .collect();

        if actions.is_empty() {
            return Err(PlanError::NothingSelected);
        }
        Ok(actions)
    }

    /// Plan from the highlighted dialog entry
    pub fn plan_dialog(
        &self,
        snapshot: &Snapshot,
    ) -> Result<(Vec<UpgradeAction>, UpgradeOptions), PlanError> {
        let (class, dry_run) = self.dialog.choice().request();
        let actions = self.plan(snapshot, class, dry_run)?;
        Ok((actions, self.options(dry_run)))
    }

    /// Record that a planned upgrade is running
    pub fn begin_upgrade(&mut self) {
        self.dialog.upgrading = true;
    }

    /// Reset the dialog and batch marks once an upgrade has finished
    pub fn finish_upgrade(&mut self) {
        self.close_dialog();
        self.clear_marks();
    }

    /// Keep the selection inside the list after the snapshot changed
    pub fn clamp_selection(&mut self, snapshot: &Snapshot) {
        let last = self.visible(snapshot).len().saturating_sub(1);
        self.selected_index = self.selected_index.min(last);
    }

    /// Record a metadata fetch start; returns false if one is already running
    pub fn begin_metadata(&mut self, name: &str) -> bool {
        self.metadata_loading.insert(name.to_string())
    }

    /// Record that the metadata fetch for `name` settled
    pub fn end_metadata(&mut self, name: &str) {
        self.metadata_loading.remove(name);
    }

    /// Returns true while metadata for `name` is being fetched
    pub fn is_loading_metadata(&self, name: &str) -> bool {
        self.metadata_loading.contains(name)
    }

    /// Summary counts for `snapshot`
    pub fn summary(&self, snapshot: &Snapshot) -> SnapshotSummary {
        SnapshotSummary::from_snapshot(snapshot)
    }
}
