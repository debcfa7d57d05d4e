//! # State Record Model
//!
//! The persisted aggregate describing every file the engine manages, plus
//! the naming rules that mark a file as managed in the first place.
//!
//! ## Document layout
//!
//! The state document is a single JSON file at `<root>/.lock-file`,
//! serialized with 2-space indentation and stable (declaration-order)
//! fields:
//!
//! - `schema_version` — must equal [`SCHEMA_VERSION`]; mismatch is a hard
//!   failure with no migration path.
//! - `last_updated` — stamped on every save.
//! - `repositories[]` — source repositories with their resolved release,
//!   downloaded archives, and license file.
//! - `remote_text_files[]` — tracked text files, keyed by local path.
//! - `generated_files[]` — locally generated outputs, keyed by path.
//! - `archive_files[]` — standalone tracked archives.
//! - `config` — an opaque snapshot of the configuration that produced this
//!   state, compared by fingerprint only.
//!
//! ## Managed markers
//!
//! A managed file embeds one of two markers in its file name: `.copy.` for
//! a pristine copy of remote content, `.patch.` for the diff sibling of a
//! locally patched file. The markers double as the orphan-detection
//! predicate during cleanup: a marker-bearing file the state does not
//! reference is fair game for deletion.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Current state document schema version. Mismatch is a hard failure.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// File name of the persisted state document, relative to the root.
pub const STATE_FILE_NAME: &str = ".lock-file";

/// Marker embedded in the name of a pristine remote copy.
pub const PRISTINE_MARKER: &str = ".copy.";

/// Marker embedded in the name of a patch sibling.
pub const PATCHED_MARKER: &str = ".patch.";

/// Root aggregate persisted to the state document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateFile {
    pub schema_version: String,
    pub last_updated: DateTime<Utc>,
    pub repositories: Vec<Repository>,
    pub remote_text_files: Vec<RemoteTextFile>,
    pub generated_files: Vec<GeneratedFile>,
    pub archive_files: Vec<ArchiveFile>,
    /// Opaque configuration snapshot; compared by fingerprint only.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl StateFile {
    /// Create an empty state record at the current schema version.
    pub fn new() -> Self {
        StateFile {
            schema_version: SCHEMA_VERSION.to_string(),
            last_updated: Utc::now(),
            repositories: Vec::new(),
            remote_text_files: Vec::new(),
            generated_files: Vec::new(),
            archive_files: Vec::new(),
            config: serde_json::Value::Null,
        }
    }

    /// Find a tracked file by its local path.
    pub fn remote_text_file(&self, path: &Path) -> Option<&RemoteTextFile> {
        let key = path.to_string_lossy();
        self.remote_text_files
            .iter()
            .find(|f| f.path.as_str() == key.as_ref())
    }

    /// Append-or-replace a tracked file record, keyed by local path.
    ///
    /// Returns `true` when an existing record was replaced.
    pub fn upsert_remote_text_file(&mut self, file: RemoteTextFile) -> bool {
        if let Some(existing) = self
            .remote_text_files
            .iter_mut()
            .find(|f| f.path == file.path)
        {
            *existing = file;
            true
        } else {
            self.remote_text_files.push(file);
            false
        }
    }

    /// Append-or-replace a generated file record, keyed by path.
    pub fn upsert_generated_file(&mut self, file: GeneratedFile) -> bool {
        if let Some(existing) = self.generated_files.iter_mut().find(|f| f.path == file.path) {
            *existing = file;
            true
        } else {
            self.generated_files.push(file);
            false
        }
    }

    /// Append-or-replace a repository record, keyed by name.
    pub fn upsert_repository(&mut self, repository: Repository) -> bool {
        if let Some(existing) = self
            .repositories
            .iter_mut()
            .find(|r| r.name == repository.name)
        {
            *existing = repository;
            true
        } else {
            self.repositories.push(repository);
            false
        }
    }

    /// Every path the state references, used as the cleanup known-set:
    /// tracked files, their patch siblings, generated files, archives
    /// (standalone and per-release), and license files.
    pub fn known_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for f in &self.remote_text_files {
            paths.push(f.path.clone());
            if let Some(patch) = &f.patch {
                paths.push(patch.path.clone());
            }
        }
        for f in &self.generated_files {
            paths.push(f.path.clone());
        }
        for a in &self.archive_files {
            paths.push(a.path.clone());
        }
        for r in &self.repositories {
            for a in &r.release.archives {
                paths.push(a.path.clone());
            }
            if let Some(license) = &r.release.license {
                paths.push(license.path.clone());
            }
        }
        paths
    }

    /// Wipe the record back to empty, keeping the current schema version.
    pub fn clear(&mut self) {
        *self = StateFile::new();
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// A source repository and the release state was last synced from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub name: String,
    pub release: Release,
}

/// A resolved release of a source repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub r#ref: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archives: Vec<ArchiveFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseFile>,
}

/// A downloaded archive tracked by local path and content hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveFile {
    pub path: String,
    pub hash: String,
}

/// A license file extracted alongside a release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LicenseFile {
    pub path: String,
}

/// A locally generated output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedFile {
    pub path: String,
    pub hash: String,
    pub last_updated: DateTime<Utc>,
}

/// A tracked text file copied from a remote repository.
///
/// Keyed by `path`. `hash` always reflects the bytes on disk as of the
/// last put or patch application; it is never recomputed lazily.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteTextFile {
    pub path: String,
    pub repository: String,
    pub r#ref: String,
    pub hash: String,
    pub patched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Patch>,
    pub permalink: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Patch bookkeeping for a locally modified tracked file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Diagnostic before/after block; not a minimal line diff.
    pub diff: String,
    pub diff_hash: String,
    /// Gzip-compressed, base64-encoded pre-modification content.
    pub remote_content: String,
    /// Sibling file holding the diff text.
    pub path: String,
}

/// Check whether a path's file name carries a managed marker.
pub fn has_managed_marker(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.contains(PRISTINE_MARKER) || name.contains(PATCHED_MARKER),
        None => false,
    }
}

/// Check whether a path's file name carries the pristine-copy marker.
pub fn is_pristine_path(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some(name) if name.contains(PRISTINE_MARKER)
    )
}

/// Derive the patch sibling path by substituting the pristine marker in
/// the file name with the patched marker.
///
/// `x.copy.txt` becomes `x.patch.txt`. Fails with [`Error::InvalidPath`]
/// when the pristine marker is absent: a file that was never a pristine
/// copy cannot be patched.
pub fn patch_sibling_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidPath {
            path: path.display().to_string(),
            message: "path has no file name".to_string(),
        })?;

    if !name.contains(PRISTINE_MARKER) {
        return Err(Error::InvalidPath {
            path: path.display().to_string(),
            message: format!("missing pristine marker '{}'", PRISTINE_MARKER),
        });
    }

    let sibling = name.replacen(PRISTINE_MARKER, PATCHED_MARKER, 1);
    Ok(path.with_file_name(sibling))
}
