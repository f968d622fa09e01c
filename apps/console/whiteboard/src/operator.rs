//! Lines the operator types at the console prompt.

use crate::error::WhiteboardError;

use whiteboard_core::crossbar::Credentials;

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;

pub const HELP_TEXT: &str = "\
commands:
  login <username> <password> <account>   sign in and open the whiteboard
  clear                                   clear everyone's surface
  logout                                  sign out
  status                                  show the session state
  help                                    show this text
  quit                                    exit";

#[derive(Debug, Clone)]
pub enum OperatorCommand {
    Login(Credentials),
    Clear,
    Logout,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`WhiteboardError::Command`] for an unknown command or wrong
/// argument count.
#[track_caller]
pub fn parse_command(line: &str) -> Result<Option<OperatorCommand>, WhiteboardError> {
    let words: Vec<&str> = line.split_whitespace().collect();

    let command = match words.as_slice() {
        [] => return Ok(None),
        ["login", username, password, account] => OperatorCommand::Login(Credentials::new(
            *username,
            RedactedSecret::new(*password),
            *account,
        )),
        ["login", ..] => {
            return Err(command_error(
                "usage: login <username> <password> <account>".to_string(),
            ));
        }
        ["clear"] => OperatorCommand::Clear,
        ["logout"] => OperatorCommand::Logout,
        ["status"] => OperatorCommand::Status,
        ["help" | "?"] => OperatorCommand::Help,
        ["quit" | "exit"] => OperatorCommand::Quit,
        [other, ..] => return Err(command_error(format!("unknown command '{other}'; try help"))),
    };

    Ok(Some(command))
}

#[track_caller]
fn command_error(message: String) -> WhiteboardError {
    WhiteboardError::Command {
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}
