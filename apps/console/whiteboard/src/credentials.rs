//! Sign-in credentials from the environment or a `.env` file.

use crate::error::WhiteboardError;

use whiteboard_core::crossbar::Credentials;

use common::{ErrorLocation, RedactedSecret};

use std::env;
use std::panic::Location;

use log::{info, warn};

pub const USERNAME_ENV: &str = "WHITEBOARD_USERNAME";
pub const PASSWORD_ENV: &str = "WHITEBOARD_PASSWORD";
pub const ACCOUNT_NAME_ENV: &str = "WHITEBOARD_ACCOUNT_NAME";

/// Load `.env` from the working directory, then from next to the executable.
///
/// Returns whether a file was loaded. A missing file is normal.
pub fn try_load_dotenv() -> bool {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {}", path.display());
        return true;
    }

    let Some(env_path) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
        .filter(|path| path.exists())
    else {
        return false;
    };

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from: {}", env_path.display());
            true
        }
        Err(e) => {
            warn!("Failed to parse .env at {}: {e}", env_path.display());
            false
        }
    }
}

/// Credentials from the process environment.
pub fn credentials_from_env() -> Result<Option<Credentials>, WhiteboardError> {
    credentials_from_lookup(|key| env::var(key).ok())
}

/// All three variables set: `Some`. None set: `None`.
///
/// # Errors
///
/// Returns [`WhiteboardError::Credentials`] when only some are set, naming the
/// missing ones.
#[track_caller]
pub fn credentials_from_lookup<F>(lookup: F) -> Result<Option<Credentials>, WhiteboardError>
where
    F: Fn(&str) -> Option<String>,
{
    let values = [USERNAME_ENV, PASSWORD_ENV, ACCOUNT_NAME_ENV]
        .map(|key| (key, lookup(key).filter(|value| !value.is_empty())));

    let missing: Vec<&str> = values
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| *key)
        .collect();
    let none_set = missing.len() == values.len();

    match values {
        [(_, Some(username)), (_, Some(password)), (_, Some(account_name))] => Ok(Some(
            Credentials::new(username, RedactedSecret::new(password), account_name),
        )),
        _ if none_set => Ok(None),
        _ => Err(WhiteboardError::Credentials {
            message: format!("Missing {}", missing.join(", ")),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
