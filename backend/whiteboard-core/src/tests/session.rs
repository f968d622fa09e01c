// Unit tests for the stored session file

use crate::error::session::SessionStoreError;
use crate::session::{Session, SessionStore};

use common::RedactedSecret;
use tempfile::TempDir;

fn session() -> Session {
    Session::new("acct-1", "user-7", RedactedSecret::new("token-abc"))
}

#[test]
fn given_nothing_saved_when_loaded_then_returns_none() {
    let dir = TempDir::new().expect("temp dir");

    let loaded = SessionStore::new(dir.path()).load().expect("load");

    assert_eq!(loaded, None);
}

/// **VALUE**: Verifies a saved session is restored with its token intact.
///
/// **WHY THIS MATTERS**: The token is redacted on Serialize; the store must
/// write it explicitly or a restart resumes with an empty token and the
/// server rejects the subscribe.
#[test]
fn given_saved_session_when_loaded_then_token_restored() {
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::new(dir.path());

    store.save(&session()).expect("save");
    let loaded = store.load().expect("load").expect("session present");

    assert_eq!(loaded, session());
    assert_eq!(loaded.auth_token.expose(), "token-abc");
}

#[test]
fn given_saved_session_when_cleared_then_load_returns_none() {
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::new(dir.path());
    store.save(&session()).expect("save");

    store.clear().expect("clear");

    assert!(!store.path().exists());
    assert_eq!(store.load().expect("load"), None);
}

#[test]
fn given_no_file_when_cleared_then_succeeds() {
    let dir = TempDir::new().expect("temp dir");

    assert!(SessionStore::new(dir.path()).clear().is_ok());
}

#[test]
fn given_corrupt_file_when_loaded_then_returns_error() {
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::new(dir.path());
    std::fs::write(store.path(), "not json").expect("write");

    assert!(store.load().is_err());
}

/// **VALUE**: A parse failure is located at the `load` call, not inside the store.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from
/// `SessionStore::load`, or the location being taken inside the `map_err`
/// closure, either of which points every report into session/mod.rs.
#[test]
fn given_corrupt_file_when_loaded_then_error_location_is_the_caller() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::new(dir.path());
    std::fs::write(store.path(), "{\"account_id\":").expect("write");

    // WHEN
    let result = store.load();
    let expected_line = line!() - 1;

    // THEN
    match result {
        Err(SessionStoreError::Parse { location, .. }) => {
            assert!(location.file.ends_with("session.rs"));
            assert!(!location.file.contains("session/mod.rs"));
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected Parse error, got {other:?}"),
    }
}
