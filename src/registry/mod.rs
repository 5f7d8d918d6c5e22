//! Registry access for package metadata
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm Registry metadata source

mod client;
mod npm;

pub use client::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use npm::{NpmRegistry, NPM_REGISTRY_URL};

use crate::domain::PackageMetadata;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Trait for sources of package metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata for a package
    async fn fetch(&self, package: &str) -> Result<PackageMetadata, RegistryError>;
}
