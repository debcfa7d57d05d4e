//! # Source Collaborator Seams
//!
//! Trait-based seams between the state engine and the remote repository
//! client. The engine never performs network I/O itself; it consumes a
//! [`SourceFile`] handed to it by whoever resolved the remote content.
//!
//! ## Design
//!
//! Resolution is explicit dependency injection: a [`SourceResolver`] object
//! is passed to whatever constructs the engine's collaborators, replacing
//! the global mutable provider registry the original design used. This
//! keeps provider lookup testable and free of package-level shared state.
//!
//! In-memory implementations (`StaticSourceFile`, `StaticResolver`) back
//! unit tests and any caller that already holds the content bytes. The
//! real HTTP-backed provider lives outside this crate and only needs to
//! implement these traits.

use std::collections::BTreeMap;
use std::io::Read;

use crate::error::{Error, Result};
use crate::hash;

/// A remote repository, identified by name (e.g. `owner/repo`).
pub trait SourceRepository {
    fn name(&self) -> &str;
}

/// A resolved release (tag, branch, or commit) of a source repository.
pub trait SourceRelease {
    /// The release reference the content was fetched at.
    fn r#ref(&self) -> &str;

    /// Back-reference to the owning repository.
    fn repository(&self) -> &dyn SourceRepository;
}

/// A single file within a release of a source repository.
pub trait SourceFile: std::fmt::Debug {
    /// Path of the file within the source repository.
    fn path(&self) -> &str;

    /// Open the file's content as a byte stream.
    ///
    /// For network-backed providers this is where the fetch happens; it
    /// executes synchronously on the calling thread.
    fn content(&self) -> Result<Box<dyn Read + '_>>;

    /// Stable web URL for viewing this file at its release.
    fn web_view_permalink(&self) -> String;

    /// Back-reference to the release the file belongs to.
    fn release(&self) -> &dyn SourceRelease;
}

/// Maps `(repository, ref, path)` to a concrete [`SourceFile`].
///
/// Injected explicitly wherever source content is needed; there is no
/// global registry.
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, repository: &str, r#ref: &str, path: &str) -> Result<Box<dyn SourceFile>>;
}

/// An opaque configuration snapshot, compared by fingerprint only.
pub trait ConfigSnapshot {
    /// Deterministic fingerprint of the snapshot content.
    fn fingerprint(&self) -> String;
}

/// A configuration snapshot backed by a JSON value.
#[derive(Debug, Clone)]
pub struct JsonConfigSnapshot {
    value: serde_json::Value,
}

impl JsonConfigSnapshot {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

impl ConfigSnapshot for JsonConfigSnapshot {
    fn fingerprint(&self) -> String {
        hash::hash_bytes(self.value.to_string().as_bytes())
    }
}

/// In-memory [`SourceFile`] holding its content bytes directly.
#[derive(Debug, Clone)]
pub struct StaticSourceFile {
    path: String,
    content: Vec<u8>,
    permalink: String,
    release: StaticRelease,
}

impl StaticSourceFile {
    pub fn new(
        repository: &str,
        r#ref: &str,
        path: &str,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let permalink = format!("https://example.com/{}/blob/{}/{}", repository, r#ref, path);
        Self {
            path: path.to_string(),
            content: content.into(),
            permalink,
            release: StaticRelease {
                r#ref: r#ref.to_string(),
                repository: StaticRepository {
                    name: repository.to_string(),
                },
            },
        }
    }

    /// Override the generated permalink.
    pub fn with_permalink(mut self, permalink: &str) -> Self {
        self.permalink = permalink.to_string();
        self
    }
}

impl SourceFile for StaticSourceFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn content(&self) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.content.as_slice()))
    }

    fn web_view_permalink(&self) -> String {
        self.permalink.clone()
    }

    fn release(&self) -> &dyn SourceRelease {
        &self.release
    }
}

/// In-memory release back-reference for [`StaticSourceFile`].
#[derive(Debug, Clone)]
pub struct StaticRelease {
    r#ref: String,
    repository: StaticRepository,
}

impl SourceRelease for StaticRelease {
    fn r#ref(&self) -> &str {
        &self.r#ref
    }

    fn repository(&self) -> &dyn SourceRepository {
        &self.repository
    }
}

/// In-memory repository back-reference for [`StaticSourceFile`].
#[derive(Debug, Clone)]
pub struct StaticRepository {
    name: String,
}

impl SourceRepository for StaticRepository {
    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory [`SourceResolver`] over a fixed set of files.
#[derive(Debug, Default)]
pub struct StaticResolver {
    files: BTreeMap<(String, String, String), StaticSourceFile>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file for resolution.
    pub fn insert(&mut self, file: StaticSourceFile) {
        let key = (
            file.release.repository.name.clone(),
            file.release.r#ref.clone(),
            file.path.clone(),
        );
        self.files.insert(key, file);
    }
}

impl SourceResolver for StaticResolver {
    fn resolve(&self, repository: &str, r#ref: &str, path: &str) -> Result<Box<dyn SourceFile>> {
        let key = (
            repository.to_string(),
            r#ref.to_string(),
            path.to_string(),
        );
        match self.files.get(&key) {
            Some(file) => Ok(Box::new(file.clone())),
            None => Err(Error::NotFound {
                path: format!("{}@{}:{}", repository, r#ref, path),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_file_back_references() {
        let file = StaticSourceFile::new("upstream/templates", "v1.2.3", "x.txt", "Hello");

        assert_eq!(file.path(), "x.txt");
        assert_eq!(file.release().r#ref(), "v1.2.3");
        assert_eq!(file.release().repository().name(), "upstream/templates");
        assert!(file.web_view_permalink().contains("v1.2.3"));
    }

    #[test]
    fn test_static_source_file_content_stream() {
        let file = StaticSourceFile::new("r", "v1", "x.txt", "Hello World");
        let mut content = Vec::new();
        file.content().unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"Hello World");
    }

    #[test]
    fn test_static_resolver_lookup() {
        let mut resolver = StaticResolver::new();
        resolver.insert(StaticSourceFile::new("r", "v1", "a.txt", "A"));

        let file = resolver.resolve("r", "v1", "a.txt").unwrap();
        assert_eq!(file.path(), "a.txt");

        let err = resolver.resolve("r", "v1", "missing.txt").unwrap_err();
        assert!(err.is_not_found());

        let err = resolver.resolve("r", "v2", "a.txt").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_config_fingerprint_is_stable() {
        let a = JsonConfigSnapshot::new(serde_json::json!({"repos": ["r1", "r2"]}));
        let b = JsonConfigSnapshot::new(serde_json::json!({"repos": ["r1", "r2"]}));
        let c = JsonConfigSnapshot::new(serde_json::json!({"repos": ["r1"]}));

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
