// Unit tests for resuming the stored session at startup

use crate::resume::resumable_session;

use whiteboard_core::session::{Session, SessionStore};

use common::RedactedSecret;
use tempfile::TempDir;

fn session() -> Session {
    Session::new("acct-1", "user-7", RedactedSecret::new("token-abc"))
}

/// **VALUE**: A truncated `session.json` is dropped instead of stopping startup.
///
/// **WHY THIS MATTERS**: The binary reads the stored session before anything
/// else. If a corrupt file were fatal, every launch would exit until the
/// operator found and deleted the file by hand.
///
/// **BUG THIS CATCHES**: Would catch the load error being propagated with `?`,
/// or the corrupt file being left behind to fail again next launch.
#[test]
fn given_corrupt_session_file_when_resuming_then_none_and_file_removed() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::new(dir.path());
    std::fs::write(store.path(), "{\"account_id\": \"acct-1\", \"owner").expect("write");

    // WHEN
    let resumed = resumable_session(&store);

    // THEN
    assert_eq!(resumed, None);
    assert!(!store.path().exists(), "Corrupt file should be deleted");
}

#[test]
fn given_saved_session_when_resuming_then_returns_it() {
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::new(dir.path());
    store.save(&session()).expect("save");

    assert_eq!(resumable_session(&store), Some(session()));
    assert!(store.path().exists());
}

#[test]
fn given_no_session_file_when_resuming_then_none() {
    let dir = TempDir::new().expect("temp dir");

    assert_eq!(resumable_session(&SessionStore::new(dir.path())), None);
}
