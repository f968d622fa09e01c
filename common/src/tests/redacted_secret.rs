// Unit tests for RedactedSecret

use crate::RedactedSecret;

/// **VALUE**: Verifies the auth token never appears in `{:?}` or `{}` output.
///
/// **WHY THIS MATTERS**: Sessions are logged on every transition. A token that leaks
/// into `whiteboard.log` is a credential sitting in plain text on disk.
///
/// **BUG THIS CATCHES**: Would catch a derived `Debug` replacing the manual impl.
#[test]
fn given_secret_when_formatted_then_value_is_hidden() {
    // GIVEN: A secret with a recognisable value
    let secret = RedactedSecret::new("tok-abc123");

    // WHEN: Formatting it both ways
    let debug = format!("{:?}", secret);
    let display = format!("{}", secret);

    // THEN: Neither output contains the value
    assert!(!debug.contains("tok-abc123"));
    assert!(!display.contains("tok-abc123"));
    assert_eq!(secret.expose(), "tok-abc123");
    assert_eq!(secret.len(), 10);
}

/// **VALUE**: Verifies serde refuses to serialize a secret implicitly.
///
/// **WHY THIS MATTERS**: Wire structs must opt in with `expose()`. Deriving `Serialize`
/// on a struct holding a secret should fail loudly instead of shipping the value.
///
/// **BUG THIS CATCHES**: Would catch the custom `Serialize` impl being removed.
#[test]
fn given_secret_when_serialized_then_returns_error() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("hunter2");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&secret);

    // THEN: Serialization fails with the redaction error
    let err = result.expect_err("Secret serialization must fail");
    assert!(err.to_string().contains("Secret Serialization Error"));
}
