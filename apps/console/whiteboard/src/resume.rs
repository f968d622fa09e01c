//! Resuming the session stored by the last run.

use whiteboard_core::error::session::SessionStoreError;
use whiteboard_core::session::{Session, SessionStore};

use log::{info, warn};

/// The stored session, if there is a usable one.
///
/// Resuming is a convenience: a file that cannot be parsed is deleted and an
/// unreadable one is skipped, so startup carries on to the other sign-in paths.
pub fn resumable_session(store: &SessionStore) -> Option<Session> {
    let session = match store.load() {
        Ok(session) => session,
        Err(e @ SessionStoreError::Parse { .. }) => {
            warn!("Discarding unreadable stored session: {e}");
            if let Err(e) = store.clear() {
                warn!("Failed to remove stored session: {e}");
            }
            None
        }
        Err(e) => {
            warn!("Not resuming stored session: {e}");
            None
        }
    };

    if let Some(session) = &session {
        info!("Resuming stored session for account {}", session.account_id);
    }
    session
}
