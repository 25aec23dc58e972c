//! Integration tests for the Cachette storage module.

use std::fs;

use cachette::errors::CachetteError;
use cachette::storage::format::{read_payload, write_payload};
use cachette::storage::StorageManager;
use cachette::vault::{SecretVault, VaultPayload};
use tempfile::TempDir;

/// Helper: a manager for database "main" rooted in a fresh temp dir.
fn manager(archive_keep: usize) -> (TempDir, StorageManager) {
    let root = TempDir::new().expect("create temp dir");
    let mgr = StorageManager::with_root("main", root.path(), archive_keep).expect("construct");
    (root, mgr)
}

/// Helper: a one-entry payload with `value` stored under "k".
fn payload_with(value: &str) -> VaultPayload {
    let mut vault = SecretVault::create("test-pw").unwrap();
    vault.put("k", value).unwrap();
    vault.into_payload()
}

/// Helper: unseal "k" from a loaded payload.
fn read_k(payload: VaultPayload) -> String {
    let vault = SecretVault::unlock(payload, "test-pw").unwrap();
    vault.get("k").unwrap()
}

// ---------------------------------------------------------------------------
// Construction and layout
// ---------------------------------------------------------------------------

#[test]
fn construction_creates_the_directory_layout() {
    let root = TempDir::new().unwrap();
    let mgr = StorageManager::with_root("vacation", root.path(), 7).unwrap();

    assert_eq!(mgr.database_dir(), root.path().join("vacation"));
    assert_eq!(mgr.archive_dir(), root.path().join("_archives").join("vacation"));
    assert!(mgr.database_dir().is_dir());
    assert!(mgr.archive_dir().is_dir());
    assert_eq!(
        mgr.primary_path(),
        root.path().join("vacation").join("secrets.vault")
    );
}

#[test]
fn construction_is_idempotent() {
    let root = TempDir::new().unwrap();
    StorageManager::with_root("db", root.path(), 7).unwrap();
    // Same database again — directories already exist, must not fail.
    StorageManager::with_root("db", root.path(), 7).unwrap();
}

#[test]
fn database_names_with_path_characters_are_rejected() {
    let root = TempDir::new().unwrap();
    for bad in ["", "../evil", "a/b", "dot.dot", "name with spaces"] {
        let result = StorageManager::with_root(bad, root.path(), 7);
        assert!(
            matches!(result, Err(CachetteError::InvalidDatabaseName(_))),
            "name {bad:?} must be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// No prior state
// ---------------------------------------------------------------------------

#[test]
fn load_on_a_fresh_database_returns_none() {
    let (_root, mgr) = manager(7);
    let loaded = mgr.load().expect("load must not error");
    assert!(loaded.is_none(), "fresh database has no prior state");
}

// ---------------------------------------------------------------------------
// Save / load round-trip
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_returns_the_saved_payload() {
    let (_root, mgr) = manager(7);

    mgr.save(&payload_with("v1")).expect("save");

    let loaded = mgr.load().expect("load").expect("payload present");
    assert_eq!(read_k(loaded), "v1");
}

#[test]
fn save_overwrites_the_primary_file() {
    let (_root, mgr) = manager(7);

    mgr.save(&payload_with("old")).unwrap();
    mgr.save(&payload_with("new")).unwrap();

    let loaded = mgr.load().unwrap().unwrap();
    assert_eq!(read_k(loaded), "new");
}

#[test]
fn empty_payload_round_trips() {
    let (_root, mgr) = manager(7);
    mgr.save(&VaultPayload::new()).unwrap();

    let loaded = mgr.load().unwrap().expect("present but empty");
    assert!(loaded.is_empty());
}

// ---------------------------------------------------------------------------
// Archival
// ---------------------------------------------------------------------------

#[test]
fn each_save_creates_exactly_one_archive_entry() {
    let (_root, mgr) = manager(7);

    for i in 0..3 {
        mgr.save(&payload_with(&format!("v{i}"))).unwrap();
        assert_eq!(mgr.archive_entries().unwrap().len(), i + 1);
    }
}

#[test]
fn archive_entry_reflects_the_version_being_saved() {
    let (_root, mgr) = manager(7);
    mgr.save(&payload_with("current")).unwrap();

    let entries = mgr.archive_entries().unwrap();
    let newest = entries.last().expect("one entry");

    // The archive copy is taken from the freshly written primary file.
    assert_eq!(
        fs::read(newest).unwrap(),
        fs::read(mgr.primary_path()).unwrap()
    );
}

#[test]
fn archive_entries_are_sorted_oldest_first() {
    let (_root, mgr) = manager(7);
    for i in 0..4 {
        mgr.save(&payload_with(&format!("v{i}"))).unwrap();
    }

    let entries = mgr.archive_entries().unwrap();
    let mut sorted = entries.clone();
    sorted.sort();
    assert_eq!(entries, sorted);
}

// ---------------------------------------------------------------------------
// Fallback to the newest archive entry
// ---------------------------------------------------------------------------

#[test]
fn load_falls_back_to_the_newest_archive_when_primary_is_missing() {
    let (_root, mgr) = manager(7);

    mgr.save(&payload_with("v1")).unwrap();
    mgr.save(&payload_with("v2")).unwrap();
    mgr.save(&payload_with("v3")).unwrap();

    fs::remove_file(mgr.primary_path()).expect("simulate lost primary");

    let loaded = mgr.load().expect("load").expect("recovered from archive");
    assert_eq!(read_k(loaded), "v3", "must recover the most recent version");
}

#[test]
fn load_with_no_primary_and_no_archives_returns_none() {
    let (_root, mgr) = manager(7);

    mgr.save(&payload_with("v1")).unwrap();
    fs::remove_file(mgr.primary_path()).unwrap();
    for entry in mgr.archive_entries().unwrap() {
        fs::remove_file(entry).unwrap();
    }

    assert!(mgr.load().unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

#[test]
fn retention_converges_to_the_keep_count() {
    let (_root, mgr) = manager(7);

    for i in 0..10 {
        mgr.save(&payload_with(&format!("v{i}"))).unwrap();
    }

    let entries = mgr.archive_entries().unwrap();
    assert!(entries.len() <= 7, "got {} entries", entries.len());

    // The survivors are the most recent ones: the newest archive entry
    // still holds the last version saved.
    fs::remove_file(mgr.primary_path()).unwrap();
    let loaded = mgr.load().unwrap().unwrap();
    assert_eq!(read_k(loaded), "v9");
}

#[test]
fn retention_deletes_the_oldest_entries_first() {
    let (_root, mgr) = manager(3);

    for i in 0..5 {
        mgr.save(&payload_with(&format!("v{i}"))).unwrap();
    }

    let entries = mgr.archive_entries().unwrap();
    assert_eq!(entries.len(), 3);

    // One more save rotates out the current oldest.
    let oldest = entries[0].clone();
    mgr.save(&payload_with("v5")).unwrap();

    let entries = mgr.archive_entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(!entries.contains(&oldest), "oldest entry must be vacuumed");
}

#[test]
fn retention_respects_a_custom_keep_count() {
    let (_root, mgr) = manager(2);

    for i in 0..6 {
        mgr.save(&payload_with(&format!("v{i}"))).unwrap();
    }

    assert_eq!(mgr.archive_entries().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Corruption is distinct from "no prior state"
// ---------------------------------------------------------------------------

#[test]
fn garbage_primary_file_reports_corrupt_payload() {
    let (_root, mgr) = manager(7);
    fs::write(mgr.primary_path(), b"this is not a vault file").unwrap();

    let result = mgr.load();
    assert!(matches!(result, Err(CachetteError::CorruptPayload(_))));
}

#[test]
fn unsupported_format_version_is_rejected() {
    let (_root, mgr) = manager(7);

    // Valid magic, bogus version byte.
    let mut bytes = b"CVLT".to_vec();
    bytes.push(9);
    bytes.extend_from_slice(b"{\"entries\":{}}");
    fs::write(mgr.primary_path(), &bytes).unwrap();

    let result = mgr.load();
    assert!(matches!(result, Err(CachetteError::CorruptPayload(_))));
}

#[test]
fn truncated_primary_file_reports_corrupt_payload() {
    let (_root, mgr) = manager(7);
    fs::write(mgr.primary_path(), b"CV").unwrap();

    let result = mgr.load();
    assert!(matches!(result, Err(CachetteError::CorruptPayload(_))));
}

// ---------------------------------------------------------------------------
// Envelope format
// ---------------------------------------------------------------------------

#[test]
fn envelope_round_trips_through_write_and_read() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("payload.vault");

    write_payload(&path, &payload_with("value")).unwrap();
    let loaded = read_payload(&path).unwrap();
    assert_eq!(read_k(loaded), "value");
}

#[test]
fn envelope_write_leaves_no_temp_file_behind() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("payload.vault");

    write_payload(&path, &VaultPayload::new()).unwrap();

    let names: Vec<_> = fs::read_dir(root.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["payload.vault"]);
}

// ---------------------------------------------------------------------------
// End-to-end: the flow the front-end drives
// ---------------------------------------------------------------------------

#[test]
fn full_session_flow() {
    let root = TempDir::new().unwrap();

    // Session 1: no prior state, create, store, save.
    let mgr = StorageManager::with_root("personal", root.path(), 7).unwrap();
    assert!(mgr.load().unwrap().is_none());

    let mut vault = SecretVault::create("master-pw").unwrap();
    vault.put("email", "hunter2").unwrap();
    vault.put("bank", "letmein").unwrap();
    mgr.save(vault.payload()).unwrap();

    // Session 2: reload with the right password.
    let mgr = StorageManager::with_root("personal", root.path(), 7).unwrap();
    let payload = mgr.load().unwrap().expect("prior state");
    let vault = SecretVault::unlock(payload, "master-pw").unwrap();
    assert!(vault.key_matches().unwrap());
    assert_eq!(vault.get("email").unwrap(), "hunter2");

    // Session 3: wrong password is detected up front, not on each get.
    let payload = mgr.load().unwrap().unwrap();
    let vault = SecretVault::unlock(payload, "wrong-pw").unwrap();
    assert!(!vault.key_matches().unwrap());
}
