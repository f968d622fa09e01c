// Unit tests for credentials lookup
// The lookup is injected so no test touches the process environment

use crate::credentials::{
    ACCOUNT_NAME_ENV, PASSWORD_ENV, USERNAME_ENV, credentials_from_lookup,
};
use crate::error::WhiteboardError;

use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn given_all_variables_when_looked_up_then_returns_credentials() {
    // GIVEN
    let env = lookup(&[
        (USERNAME_ENV, "alice"),
        (PASSWORD_ENV, "secret"),
        (ACCOUNT_NAME_ENV, "acme"),
    ]);

    // WHEN
    let credentials = credentials_from_lookup(env)
        .expect("complete set is valid")
        .expect("credentials present");

    // THEN
    assert_eq!(credentials.username, "alice");
    assert_eq!(credentials.password.expose(), "secret");
    assert_eq!(credentials.account_name, "acme");
}

#[test]
fn given_no_variables_when_looked_up_then_returns_none() {
    let result = credentials_from_lookup(lookup(&[]));

    assert!(matches!(result, Ok(None)));
}

/// **VALUE**: A half-configured environment is reported with the missing names.
///
/// **WHY THIS MATTERS**: Silently ignoring a set username with no password
/// would leave the operator at the login prompt wondering why auto sign-in
/// did nothing.
#[test]
fn given_partial_variables_when_looked_up_then_error_names_missing_ones() {
    // GIVEN: Password set but empty, account missing
    let env = lookup(&[(USERNAME_ENV, "alice"), (PASSWORD_ENV, "")]);

    // WHEN
    let result = credentials_from_lookup(env);

    // THEN
    match result {
        Err(WhiteboardError::Credentials { message, .. }) => {
            assert!(message.contains(PASSWORD_ENV));
            assert!(message.contains(ACCOUNT_NAME_ENV));
            assert!(!message.contains(USERNAME_ENV));
        }
        other => panic!("Expected Credentials error, got {other:?}"),
    }
}
