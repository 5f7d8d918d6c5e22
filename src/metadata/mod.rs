//! Package metadata retrieval
//!
//! This module provides:
//! - A generic request coalescer with a success cache
//! - The metadata cache used by the dashboard's info view

mod cache;
pub mod coalesce;

pub use cache::MetadataCache;
pub use coalesce::RequestCoalescer;
