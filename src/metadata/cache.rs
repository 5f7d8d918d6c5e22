//! Process-lifetime cache of registry metadata

use super::coalesce::RequestCoalescer;
use crate::domain::PackageMetadata;
use crate::registry::MetadataSource;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Metadata cache in front of a [`MetadataSource`].
///
/// Each package is fetched at most once at a time; successful results are
/// kept until [`MetadataCache::clear`]. Missing packages and failures yield
/// `None` and are retried on the next call.
pub struct MetadataCache {
    source: Arc<dyn MetadataSource>,
    requests: RequestCoalescer<String, Arc<PackageMetadata>>,
}

impl MetadataCache {
    /// Create a cache backed by `source`
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            requests: RequestCoalescer::new(),
        }
    }

    /// Metadata for `name`, fetching it if needed.
    ///
    /// Cancelling `cancel` makes this call return `None` without logging.
    pub async fn fetch(
        &self,
        name: &str,
        cancel: Option<&CancellationToken>,
    ) -> Option<Arc<PackageMetadata>> {
        let source = Arc::clone(&self.source);
        let package = name.to_string();
        self.requests
            .fetch(name.to_string(), cancel, move || async move {
                match source.fetch(&package).await {
                    Ok(metadata) => Some(Arc::new(metadata)),
                    Err(e) if e.is_not_found() => {
                        tracing::debug!(%package, "package not found in registry");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(%package, error = %e, "failed to fetch package metadata");
                        None
                    }
                }
            })
            .await
    }

    /// Cached metadata for `name`, without fetching
    pub fn cached(&self, name: &str) -> Option<Arc<PackageMetadata>> {
        self.requests.get(&name.to_string())
    }

    /// Returns true while metadata for `name` is being fetched
    pub fn is_fetching(&self, name: &str) -> bool {
        self.requests.is_pending(&name.to_string())
    }

    /// Forget every cached entry
    pub fn clear(&self) {
        self.requests.clear();
    }
}
