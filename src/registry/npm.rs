//! npm Registry metadata source
//!
//! Fetches the package document from an npm-compatible registry and
//! normalizes it into [`PackageMetadata`].
//! API endpoint: {registry}/{package}, with the scope separator encoded as `%2F`

use crate::domain::{Author, Maintainer, PackageMetadata, PublishTimes, Repository};
use crate::error::RegistryError;
use crate::registry::{HttpClient, MetadataSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Public npm registry base URL
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

const REGISTRY_NAME: &str = "npm";

/// npm registry metadata source
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

/// `license` is either an SPDX string or a legacy `{ "type": ... }` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLicense {
    Text(String),
    Object {
        #[serde(rename = "type")]
        kind: Option<String>,
    },
}

impl NpmRegistry {
    /// Create a source for the public registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, NPM_REGISTRY_URL)
    }

    /// Create a source for a custom registry
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build the URL for a package
    fn package_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, package.replacen('/', "%2F", 1))
    }
}

#[async_trait]
impl MetadataSource for NpmRegistry {
    async fn fetch(&self, package: &str) -> Result<PackageMetadata, RegistryError> {
        let url = self.package_url(package);
        let document: Value = self.client.get_json(&url, package, REGISTRY_NAME).await?;
        if !document.is_object() {
            return Err(RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: REGISTRY_NAME.to_string(),
                message: "expected a JSON object".to_string(),
            });
        }
        Ok(normalize(package, &document))
    }
}

fn field<T: DeserializeOwned>(document: &Value, key: &str) -> Option<T> {
    document
        .get(key)
        .filter(|value| !value.is_null())
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

/// Normalize a registry document; malformed fields are dropped
fn normalize(package: &str, document: &Value) -> PackageMetadata {
    let dist_tags: Option<BTreeMap<String, String>> = field(document, "dist-tags");
    let version = dist_tags
        .as_ref()
        .and_then(|tags| tags.get("latest").cloned())
        .or_else(|| field(document, "version"));
    let license = field::<RawLicense>(document, "license").and_then(|license| match license {
        RawLicense::Text(text) => Some(text),
        RawLicense::Object { kind } => kind,
    });
    let versions = document
        .get("versions")
        .and_then(Value::as_object)
        .map(|versions| versions.keys().cloned().collect());

    PackageMetadata {
        name: field(document, "name").unwrap_or_else(|| package.to_string()),
        description: field(document, "description"),
        version,
        author: field::<Author>(document, "author"),
        maintainers: field::<Vec<Maintainer>>(document, "maintainers"),
        homepage: field(document, "homepage"),
        repository: field::<Repository>(document, "repository"),
        license,
        keywords: field(document, "keywords"),
        versions,
        time: field::<PublishTimes>(document, "time"),
        dist_tags,
    }
}
