use pctechlibrary::libpctech::db::SqliteCommentStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Opens a fresh file-backed store. The database lives inside the returned
/// `TempDir` and is removed when the guard is dropped.
pub fn create_test_db() -> (SqliteCommentStore, PathBuf, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("comments.db");
    let store = SqliteCommentStore::create_or_open(&path).expect("failed to create test database");
    (store, path, dir)
}
