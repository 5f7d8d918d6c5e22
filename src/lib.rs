//! depdash - Dependency dashboard library for Node.js projects
//!
//! This library provides the core functionality for inspecting and
//! upgrading the dependencies of npm, yarn, pnpm and bun projects:
//! - Package manager detection from lockfiles
//! - Outdated report normalization and update classification
//! - Conflict heuristics from install and tree probes
//! - Upgrades gated by safe mode
//! - Coalesced registry metadata lookups

pub mod cli;
pub mod conflicts;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod orchestrator;
pub mod outdated;
pub mod output;
pub mod process;
pub mod progress;
pub mod registry;
pub mod upgrade;
