//! Integration tests driving the full tracked-file lifecycle through the
//! public library API: put, patch, persist, reload, drift, cleanup.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use remote_sync::cancel::CancelToken;
use remote_sync::hash::hash_bytes;
use remote_sync::manager::{Modification, StateManager};
use remote_sync::report::{FileChangeKind, MemoryReporter};
use remote_sync::source::{SourceResolver, StaticResolver, StaticSourceFile};
use tempfile::TempDir;

fn resolver() -> StaticResolver {
    let mut resolver = StaticResolver::new();
    resolver.insert(StaticSourceFile::new(
        "upstream/templates",
        "v1.2.3",
        "greeting.txt",
        "Hello World",
    ));
    resolver.insert(StaticSourceFile::new(
        "upstream/templates",
        "v1.2.3",
        "config.yml",
        "retries: 3\n",
    ));
    resolver
}

#[test]
fn full_lifecycle_survives_reload() {
    let temp = TempDir::new().unwrap();
    let resolver = resolver();

    // Sync two files and patch one
    let manager = StateManager::new(temp.path());
    let greeting = resolver
        .resolve("upstream/templates", "v1.2.3", "greeting.txt")
        .unwrap();
    manager
        .put_remote_text_file(greeting.as_ref(), Path::new("greeting.copy.txt"))
        .unwrap();
    let config = resolver
        .resolve("upstream/templates", "v1.2.3", "config.yml")
        .unwrap();
    manager
        .put_remote_text_file(config.as_ref(), Path::new("conf/config.copy.yml"))
        .unwrap();
    manager
        .apply_modification(
            Path::new("greeting.copy.txt"),
            &Modification {
                from: "World".to_string(),
                to: "Universe".to_string(),
            },
        )
        .unwrap();
    manager.save().unwrap();

    // A fresh manager sees the same state and can answer content queries
    let reloaded = StateManager::new(temp.path());
    reloaded.load().unwrap();
    reloaded.validate_local_state().unwrap();
    assert!(reloaded.is_consistent());

    let record = reloaded
        .remote_text_file(Path::new("greeting.copy.txt"))
        .unwrap()
        .unwrap();
    assert!(record.patched);
    assert_eq!(record.hash, hash_bytes(b"Hello Universe"));
    assert_eq!(
        reloaded
            .raw_remote_content(Path::new("greeting.copy.txt"))
            .unwrap(),
        b"Hello World"
    );
    let diff = reloaded
        .raw_patch_content(Path::new("greeting.copy.txt"))
        .unwrap();
    assert!(String::from_utf8(diff).unwrap().contains("Hello Universe"));
}

#[test]
fn out_of_band_edits_are_detected_after_reload() {
    let temp = TempDir::new().unwrap();
    let resolver = resolver();

    let manager = StateManager::new(temp.path());
    let file = resolver
        .resolve("upstream/templates", "v1.2.3", "greeting.txt")
        .unwrap();
    manager
        .put_remote_text_file(file.as_ref(), Path::new("greeting.copy.txt"))
        .unwrap();
    manager.save().unwrap();

    fs::write(temp.path().join("greeting.copy.txt"), "hand edited").unwrap();

    let reloaded = StateManager::new(temp.path());
    reloaded.load().unwrap();
    assert!(!reloaded.is_consistent());
    assert!(reloaded.validate_local_state().is_err());
}

#[test]
fn cleanup_after_reload_removes_untracked_managed_files() {
    let temp = TempDir::new().unwrap();
    let resolver = resolver();

    let manager = StateManager::new(temp.path());
    let file = resolver
        .resolve("upstream/templates", "v1.2.3", "greeting.txt")
        .unwrap();
    manager
        .put_remote_text_file(file.as_ref(), Path::new("a.copy.txt"))
        .unwrap();
    manager.save().unwrap();

    fs::write(temp.path().join("b.copy.txt"), "left behind").unwrap();
    fs::write(temp.path().join("README.md"), "unmanaged").unwrap();

    let reporter = Arc::new(MemoryReporter::new());
    let reloaded = StateManager::with_reporter(temp.path(), reporter.clone());
    reloaded.load().unwrap();
    let removed = reloaded.cleanup_orphaned_files(&CancelToken::new()).unwrap();

    assert_eq!(removed.len(), 1);
    assert!(temp.path().join("a.copy.txt").exists());
    assert!(!temp.path().join("b.copy.txt").exists());
    assert!(temp.path().join("README.md").exists());
    assert!(reloaded.state_path().exists());

    assert!(reporter
        .changes()
        .iter()
        .any(|c| c.kind == FileChangeKind::Deleted && c.path.ends_with("b.copy.txt")));
}

#[test]
fn repeated_put_keeps_state_stable() {
    let temp = TempDir::new().unwrap();
    let resolver = resolver();
    let manager = StateManager::new(temp.path());

    for _ in 0..3 {
        let file = resolver
            .resolve("upstream/templates", "v1.2.3", "greeting.txt")
            .unwrap();
        manager
            .put_remote_text_file(file.as_ref(), Path::new("greeting.copy.txt"))
            .unwrap();
    }

    let state = manager.snapshot().unwrap();
    assert_eq!(state.remote_text_files.len(), 1);
    assert_eq!(state.remote_text_files[0].hash, hash_bytes(b"Hello World"));
    assert!(manager.is_consistent());
}
