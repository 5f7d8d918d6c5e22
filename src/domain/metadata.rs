//! Registry metadata shown alongside a dependency

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package author, as published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    /// Free-form `"Name <email> (url)"` string
    Text(String),
    /// Structured person object
    Person {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

impl Author {
    /// Name without the email/url decorations
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Author::Text(text) => text
                .split('<')
                .next()
                .map(str::trim)
                .filter(|name| !name.is_empty()),
            Author::Person { name, .. } => name.as_deref(),
        }
    }
}

/// A package maintainer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Source repository reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    /// Shorthand or URL string
    Url(String),
    /// `{ "type": "git", "url": "..." }`
    Detailed {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        url: String,
    },
}

impl Repository {
    /// Repository location as a string
    pub fn url(&self) -> &str {
        match self {
            Repository::Url(url) => url,
            Repository::Detailed { url, .. } => url,
        }
    }
}

/// Creation and modification timestamps of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Normalized registry metadata for a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Latest dist-tag, falling back to the document version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<Maintainer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Published version numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<PublishTimes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_tags: Option<BTreeMap<String, String>>,
}

impl PackageMetadata {
    /// Creates metadata with only a name set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            version: None,
            author: None,
            maintainers: None,
            homepage: None,
            repository: None,
            license: None,
            keywords: None,
            versions: None,
            time: None,
            dist_tags: None,
        }
    }

    /// Author name for display
    pub fn author_display(&self) -> Option<&str> {
        self.author.as_ref().and_then(Author::display_name)
    }

    /// Repository URL for display
    pub fn repository_url(&self) -> Option<&str> {
        self.repository.as_ref().map(Repository::url)
    }

    /// Number of published versions
    pub fn version_count(&self) -> usize {
        self.versions.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_text_strips_email() {
        let author = Author::Text("Jordan Harband <ljharb@gmail.com>".to_string());
        assert_eq!(author.display_name(), Some("Jordan Harband"));
    }

    #[test]
    fn test_author_person() {
        let author = Author::Person {
            name: Some("Sindre Sorhus".to_string()),
            email: Some("sindresorhus@gmail.com".to_string()),
        };
        assert_eq!(author.display_name(), Some("Sindre Sorhus"));
    }

    #[test]
    fn test_author_text_only_email() {
        let author = Author::Text("<nobody@example.com>".to_string());
        assert_eq!(author.display_name(), None);
    }

    #[test]
    fn test_author_deserialize_both_shapes() {
        let text: Author = serde_json::from_str("\"TJ Holowaychuk\"").unwrap();
        assert_eq!(text, Author::Text("TJ Holowaychuk".to_string()));

        let person: Author =
            serde_json::from_str(r#"{"name": "TJ", "email": "tj@example.com"}"#).unwrap();
        assert_eq!(person.display_name(), Some("TJ"));
    }

    #[test]
    fn test_repository_shapes() {
        let short: Repository = serde_json::from_str("\"github:expressjs/express\"").unwrap();
        assert_eq!(short.url(), "github:expressjs/express");

        let detailed: Repository = serde_json::from_str(
            r#"{"type": "git", "url": "git+https://github.com/lodash/lodash.git"}"#,
        )
        .unwrap();
        assert_eq!(detailed.url(), "git+https://github.com/lodash/lodash.git");
    }

    #[test]
    fn test_metadata_helpers() {
        let mut metadata = PackageMetadata::new("left-pad");
        assert_eq!(metadata.version_count(), 0);
        assert!(metadata.author_display().is_none());

        metadata.versions = Some(vec!["1.0.0".to_string(), "1.3.0".to_string()]);
        metadata.repository = Some(Repository::Url("stevemao/left-pad".to_string()));
        assert_eq!(metadata.version_count(), 2);
        assert_eq!(metadata.repository_url(), Some("stevemao/left-pad"));
    }
}
