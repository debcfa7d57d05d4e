//! # State Manager
//!
//! Orchestrates load/save/put/validate/cleanup over the [`StateFile`]
//! record. One manager owns one root directory; the persisted document
//! lives at `<root>/.lock-file` and its save sentinel at
//! `<root>/.lock-file.lock`.
//!
//! ## Concurrency
//!
//! A single `std::sync::RwLock` guards the whole in-memory record. Every
//! mutating operation holds the write guard for its full duration;
//! read-only queries (`is_consistent`, `config_hash`) hold the read guard.
//! This protects in-process callers only. Cross-process safety exists
//! solely around `save`, via the lock file protocol; `load`, puts, and
//! cleanup can race when two processes share a root directory.
//!
//! All I/O is synchronous on the calling thread. The only cancellation
//! point is the cleanup directory walk, which polls a [`CancelToken`]
//! between entries.
//!
//! ## Notifications
//!
//! Every mutating operation reports a [`FileChange`] describing its
//! outcome, including an error notification when the operation also
//! returns an error, so batch callers keep visibility into partial
//! progress.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::fileops;
use crate::hash;
use crate::lockfile::{sentinel_path, LockGuard};
use crate::model::{
    self, GeneratedFile, Patch, RemoteTextFile, Repository, StateFile, SCHEMA_VERSION,
    STATE_FILE_NAME,
};
use crate::patch;
use crate::report::{FileChange, FileChangeKind, NullReporter, Reporter};
use crate::source::SourceFile;

/// A literal text substitution applied to a tracked file.
#[derive(Debug, Clone)]
pub struct Modification {
    pub from: String,
    pub to: String,
}

/// Manages the persisted state record for one root directory.
pub struct StateManager {
    root: PathBuf,
    state_path: PathBuf,
    state: RwLock<StateFile>,
    reporter: Arc<dyn Reporter>,
}

impl StateManager {
    /// Create a manager with a fresh in-memory record and no reporter.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_reporter(root, Arc::new(NullReporter))
    }

    /// Create a manager that forwards file-change notifications to the
    /// given reporter.
    pub fn with_reporter(root: impl AsRef<Path>, reporter: Arc<dyn Reporter>) -> Self {
        let root = root.as_ref().to_path_buf();
        let state_path = root.join(STATE_FILE_NAME);
        StateManager {
            root,
            state_path,
            state: RwLock::new(StateFile::new()),
            reporter,
        }
    }

    /// Root directory this manager operates on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the persisted state document.
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Clone of the current in-memory record, for inspection.
    pub fn snapshot(&self) -> Result<StateFile> {
        Ok(self.read_guard()?.clone())
    }

    /// Look up a tracked file by local path.
    pub fn remote_text_file(&self, local_path: &Path) -> Result<Option<RemoteTextFile>> {
        Ok(self.read_guard()?.remote_text_file(local_path).cloned())
    }

    /// Load the persisted document, replacing the in-memory record
    /// wholesale. Succeeds as a no-op when no document exists. Idempotent.
    pub fn load(&self) -> Result<()> {
        let mut state = self.write_guard()?;
        if !fileops::exists(&self.state_path) {
            debug!("no state document at {}, keeping empty record", self.state_path.display());
            return Ok(());
        }
        let content = fileops::read(&self.state_path)?;
        let parsed: StateFile = serde_json::from_slice(&content)?;
        *state = parsed;
        debug!(
            "loaded state from {} ({} tracked files)",
            self.state_path.display(),
            state.remote_text_files.len()
        );
        Ok(())
    }

    /// Persist the in-memory record atomically under the save sentinel.
    ///
    /// Fails with [`Error::LockHeld`] when another process is mid-save;
    /// in-process callers are additionally serialized by the write lock.
    /// The sentinel is released on every exit path.
    pub fn save(&self) -> Result<()> {
        let mut state = self.write_guard()?;
        let _lock = LockGuard::acquire(&self.state_path)?;

        state.last_updated = Utc::now();
        let mut json = serde_json::to_string_pretty(&*state)?;
        json.push('\n');
        fileops::write_atomic(&self.state_path, json.as_bytes())?;
        debug!("saved state to {}", self.state_path.display());
        Ok(())
    }

    /// Copy a source file's content to `local_path` and upsert its tracked
    /// record, returning the record.
    ///
    /// The write overwrites whatever is on disk so the tree always
    /// reflects the freshest remote content. That includes the working
    /// copy of a patched file: its edits are overwritten and the stored
    /// pre-patch snapshot is left stale relative to the new baseline.
    pub fn put_remote_text_file(
        &self,
        source: &dyn SourceFile,
        local_path: &Path,
    ) -> Result<RemoteTextFile> {
        match self.put_remote_text_file_inner(source, local_path) {
            Ok((record, replaced)) => {
                let kind = if replaced {
                    FileChangeKind::Updated
                } else {
                    FileChangeKind::Added
                };
                self.reporter.report(
                    &FileChange::new(kind, local_path).with_description(format!(
                        "synced from {}@{}",
                        record.repository, record.r#ref
                    )),
                );
                Ok(record)
            }
            Err(e) => {
                self.reporter
                    .report(&FileChange::new(FileChangeKind::Error, local_path).with_error(&e));
                Err(e)
            }
        }
    }

    fn put_remote_text_file_inner(
        &self,
        source: &dyn SourceFile,
        local_path: &Path,
    ) -> Result<(RemoteTextFile, bool)> {
        if !model::has_managed_marker(local_path) {
            return Err(Error::InvalidPath {
                path: local_path.display().to_string(),
                message: format!(
                    "managed files must embed '{}' or '{}' in the file name",
                    model::PRISTINE_MARKER,
                    model::PATCHED_MARKER
                ),
            });
        }

        let mut state = self.write_guard()?;

        let mut content = Vec::new();
        source.content()?.read_to_end(&mut content)?;

        let full = self.full_path(local_path);
        fileops::write(&full, &content)?;
        let digest = hash::hash_bytes(&content);

        let existing = state.remote_text_file(local_path).cloned();
        if let Some(prev) = &existing {
            if prev.patched {
                warn!(
                    "re-syncing patched file {}: local edits overwritten, stored snapshot now stale",
                    local_path.display()
                );
            }
        }

        let release = source.release();
        let record = RemoteTextFile {
            path: local_path.to_string_lossy().into_owned(),
            repository: release.repository().name().to_string(),
            r#ref: release.r#ref().to_string(),
            hash: digest,
            // Put never un-patches: the flag and snapshot survive a
            // re-sync even though the working copy was overwritten.
            patched: existing.as_ref().map(|f| f.patched).unwrap_or(false),
            patch: existing.and_then(|f| f.patch),
            permalink: source.web_view_permalink(),
            last_updated: Utc::now(),
            metadata: Default::default(),
        };

        let replaced = state.upsert_remote_text_file(record.clone());
        Ok((record, replaced))
    }

    /// Apply a literal all-occurrences substitution to a tracked file,
    /// converting it from pristine to patched on the first call.
    ///
    /// The first application snapshots the pre-modification bytes into the
    /// record; later applications reuse the existing snapshot so
    /// [`Self::raw_remote_content`] keeps returning the original remote
    /// bytes.
    pub fn apply_modification(
        &self,
        local_path: &Path,
        modification: &Modification,
    ) -> Result<RemoteTextFile> {
        match self.apply_modification_inner(local_path, modification) {
            Ok(record) => {
                self.reporter.report(
                    &FileChange::new(FileChangeKind::Updated, local_path).with_description(
                        format!("patched: '{}' -> '{}'", modification.from, modification.to),
                    ),
                );
                Ok(record)
            }
            Err(e) => {
                self.reporter
                    .report(&FileChange::new(FileChangeKind::Error, local_path).with_error(&e));
                Err(e)
            }
        }
    }

    fn apply_modification_inner(
        &self,
        local_path: &Path,
        modification: &Modification,
    ) -> Result<RemoteTextFile> {
        let mut state = self.write_guard()?;

        let record = state
            .remote_text_file(local_path)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: local_path.display().to_string(),
            })?;

        let full = self.full_path(local_path);
        let before = fileops::read(&full)?;

        // First application snapshots the original; later ones keep it.
        let (snapshot, sibling) = if record.patched {
            let existing = record.patch.as_ref().ok_or_else(|| Error::MissingPatchInfo {
                path: local_path.display().to_string(),
            })?;
            (existing.remote_content.clone(), PathBuf::from(&existing.path))
        } else {
            let sibling = model::patch_sibling_path(local_path)?;
            (patch::encode_snapshot(&before)?, sibling)
        };

        let after = patch::substitute(
            &before,
            modification.from.as_bytes(),
            modification.to.as_bytes(),
        );
        fileops::write(&full, &after)?;

        let diff = patch::diagnostic_diff(&before, &after);
        fileops::write(&self.full_path(&sibling), diff.as_bytes())?;

        let updated = RemoteTextFile {
            hash: hash::hash_bytes(&after),
            patched: true,
            patch: Some(Patch {
                diff_hash: hash::hash_bytes(diff.as_bytes()),
                diff,
                remote_content: snapshot,
                path: sibling.to_string_lossy().into_owned(),
            }),
            last_updated: Utc::now(),
            ..record
        };
        state.upsert_remote_text_file(updated.clone());
        Ok(updated)
    }

    /// The original remote bytes of a tracked file.
    ///
    /// Patched files are served from the stored snapshot without
    /// re-fetching; pristine files are read straight from disk.
    pub fn raw_remote_content(&self, local_path: &Path) -> Result<Vec<u8>> {
        let state = self.read_guard()?;
        let record = state
            .remote_text_file(local_path)
            .ok_or_else(|| Error::NotFound {
                path: local_path.display().to_string(),
            })?;

        if record.patched {
            let patch = record.patch.as_ref().ok_or_else(|| Error::MissingPatchInfo {
                path: local_path.display().to_string(),
            })?;
            patch::decode_snapshot(&patch.remote_content)
        } else {
            fileops::read(&self.full_path(local_path))
        }
    }

    /// The diagnostic diff text of a patched tracked file, read from its
    /// patch sibling.
    pub fn raw_patch_content(&self, local_path: &Path) -> Result<Vec<u8>> {
        let state = self.read_guard()?;
        let record = state
            .remote_text_file(local_path)
            .ok_or_else(|| Error::NotFound {
                path: local_path.display().to_string(),
            })?;

        if !record.patched {
            return Err(Error::NotPatched {
                path: local_path.display().to_string(),
            });
        }
        let patch = record.patch.as_ref().ok_or_else(|| Error::MissingPatchInfo {
            path: local_path.display().to_string(),
        })?;
        fileops::read(&self.full_path(Path::new(&patch.path)))
    }

    /// Write a locally generated output file and upsert its record.
    pub fn put_generated_file(&self, local_path: &Path, content: &[u8]) -> Result<GeneratedFile> {
        match self.put_generated_file_inner(local_path, content) {
            Ok((record, replaced)) => {
                let kind = if replaced {
                    FileChangeKind::Updated
                } else {
                    FileChangeKind::Added
                };
                self.reporter
                    .report(&FileChange::new(kind, local_path).with_description("generated"));
                Ok(record)
            }
            Err(e) => {
                self.reporter
                    .report(&FileChange::new(FileChangeKind::Error, local_path).with_error(&e));
                Err(e)
            }
        }
    }

    fn put_generated_file_inner(
        &self,
        local_path: &Path,
        content: &[u8],
    ) -> Result<(GeneratedFile, bool)> {
        let mut state = self.write_guard()?;
        fileops::write(&self.full_path(local_path), content)?;
        let record = GeneratedFile {
            path: local_path.to_string_lossy().into_owned(),
            hash: hash::hash_bytes(content),
            last_updated: Utc::now(),
        };
        let replaced = state.upsert_generated_file(record.clone());
        Ok((record, replaced))
    }

    /// Upsert a repository record (release, archives, license).
    pub fn record_repository(&self, repository: Repository) -> Result<()> {
        let mut state = self.write_guard()?;
        state.upsert_repository(repository);
        Ok(())
    }

    /// Full fail-fast verification of on-disk reality against the record.
    ///
    /// Checks, in order: schema version; per tracked file marker,
    /// existence, recorded-vs-recomputed hash, and patch sibling
    /// existence; per generated file existence and hash; per
    /// repository→release→archive existence and hash; license existence;
    /// standalone archives. Returns the first violation.
    pub fn validate_local_state(&self) -> Result<()> {
        let state = self.read_guard()?;

        if state.schema_version != SCHEMA_VERSION {
            return Err(Error::SchemaMismatch {
                expected: SCHEMA_VERSION.to_string(),
                found: state.schema_version.clone(),
            });
        }

        for file in &state.remote_text_files {
            let path = Path::new(&file.path);
            if !model::has_managed_marker(path) {
                return Err(Error::InvalidPath {
                    path: file.path.clone(),
                    message: "tracked file lost its managed marker".to_string(),
                });
            }
            self.check_file_hash(path, &file.hash)?;

            if file.patched {
                let patch = file.patch.as_ref().ok_or_else(|| Error::MissingPatchInfo {
                    path: file.path.clone(),
                })?;
                let sibling = self.full_path(Path::new(&patch.path));
                if !fileops::exists(&sibling) {
                    return Err(Error::NotFound {
                        path: patch.path.clone(),
                    });
                }
            }
        }

        for file in &state.generated_files {
            self.check_file_hash(Path::new(&file.path), &file.hash)?;
        }

        for repository in &state.repositories {
            for archive in &repository.release.archives {
                self.check_file_hash(Path::new(&archive.path), &archive.hash)?;
            }
            if let Some(license) = &repository.release.license {
                if !fileops::exists(&self.full_path(Path::new(&license.path))) {
                    return Err(Error::NotFound {
                        path: license.path.clone(),
                    });
                }
            }
        }

        for archive in &state.archive_files {
            self.check_file_hash(Path::new(&archive.path), &archive.hash)?;
        }

        Ok(())
    }

    fn check_file_hash(&self, path: &Path, recorded: &str) -> Result<()> {
        let full = self.full_path(path);
        if !fileops::exists(&full) {
            return Err(Error::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = fileops::read(&full)?;
        let actual = hash::hash_bytes(&content);
        if actual != recorded {
            return Err(Error::ContentMismatch {
                path: path.display().to_string(),
                recorded: recorded.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Best-effort consistency probe restricted to tracked files
    /// (existence and hash only).
    ///
    /// Any violation or unexpected I/O failure yields `false`; nothing
    /// propagates. Callers treat any doubt as "needs resync".
    pub fn is_consistent(&self) -> bool {
        let Ok(state) = self.state.read() else {
            return false;
        };
        for file in &state.remote_text_files {
            let full = self.full_path(Path::new(&file.path));
            match fileops::read(&full) {
                Ok(content) if hash::hash_bytes(&content) == file.hash => {}
                _ => return false,
            }
        }
        true
    }

    /// Delete every marker-bearing file under the root that the state no
    /// longer references, returning the removed paths.
    ///
    /// The known set covers tracked files, their patch siblings, generated
    /// files, archives (standalone and per-release), license files, and
    /// the state document itself. A deleted-file notification is emitted
    /// per removal. Any walk or delete error aborts the entire operation;
    /// there is no partial continuation with a stale known set. The walk
    /// polls the cancellation token between entries.
    pub fn cleanup_orphaned_files(&self, cancel: &CancelToken) -> Result<Vec<PathBuf>> {
        let state = self.write_guard()?;

        let known: HashSet<PathBuf> = state
            .known_paths()
            .iter()
            .map(|p| self.full_path(Path::new(p)))
            .collect();
        let sentinel = sentinel_path(&self.state_path);

        let mut removed = Vec::new();
        for entry in WalkDir::new(&self.root) {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled {
                    operation: "cleanup_orphaned_files".to_string(),
                });
            }

            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path == self.state_path || path == sentinel {
                continue;
            }
            if !model::has_managed_marker(path) || known.contains(path) {
                continue;
            }

            match fileops::delete(path) {
                Ok(()) => {
                    self.reporter.report(
                        &FileChange::new(FileChangeKind::Deleted, path)
                            .with_description("orphaned"),
                    );
                    removed.push(path.to_path_buf());
                }
                Err(e) => {
                    self.reporter
                        .report(&FileChange::new(FileChangeKind::Error, path).with_error(&e));
                    return Err(e);
                }
            }
        }
        Ok(removed)
    }

    /// Fingerprint of the persisted configuration snapshot, or `None` when
    /// no snapshot has been recorded.
    pub fn config_hash(&self) -> Result<Option<String>> {
        let state = self.read_guard()?;
        if state.config.is_null() {
            Ok(None)
        } else {
            Ok(Some(hash::hash_bytes(state.config.to_string().as_bytes())))
        }
    }

    /// Replace the opaque configuration snapshot.
    pub fn set_config(&self, config: serde_json::Value) -> Result<()> {
        let mut state = self.write_guard()?;
        state.config = config;
        Ok(())
    }

    /// Wipe the in-memory record back to empty. Does not touch disk; a
    /// following `save` persists the empty record.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.write_guard()?;
        state.clear();
        Ok(())
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, StateFile>> {
        self.state.read().map_err(|_| Error::LockPoisoned {
            context: "state record (read)".to_string(),
        })
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, StateFile>> {
        self.state.write().map_err(|_| Error::LockPoisoned {
            context: "state record (write)".to_string(),
        })
    }
}
