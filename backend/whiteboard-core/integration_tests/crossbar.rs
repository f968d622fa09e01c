use crate::helpers::{TEST_ACCOUNT_ID, TEST_AUTH_TOKEN, TEST_OWNER_ID, test_session};

use whiteboard_core::crossbar::{Credentials, CrossbarClient};
use whiteboard_core::error::crossbar::CrossbarError;

use common::RedactedSecret;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new("alice", RedactedSecret::new("secret"), "acme")
}

fn client(server: &MockServer) -> CrossbarClient {
    CrossbarClient::new(&format!("{}/v2", server.uri())).expect("Mock URL should parse")
}

// ============================================================================
// CrossbarClient::authenticate()
// ============================================================================

/// **VALUE**: Verifies the credential digest and request shape crossbar expects,
/// and that the response becomes a session.
///
/// **WHY THIS MATTERS**: Crossbar rejects anything but the MD5 of
/// `user:password`; a wrong digest is indistinguishable from a wrong password.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The digest is computed over the wrong string or in uppercase hex
/// - The version segment of the base URL is lost when joining `user_auth`
/// - `account_id` and `owner_id` are swapped
#[tokio::test]
async fn given_valid_credentials_when_authenticating_then_returns_session() {
    // GIVEN: Crossbar accepting the digest of "alice:secret"
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/user_auth"))
        .and(body_json(json!({
            "data": {
                "credentials": "6f622058968bb90757e6c6ed79e5df81",
                "account_name": "acme"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "auth_token": TEST_AUTH_TOKEN,
            "data": {"account_id": TEST_ACCOUNT_ID, "owner_id": TEST_OWNER_ID},
            "status": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN
    let session = client(&server)
        .authenticate(&credentials())
        .await
        .expect("Authentication should succeed");

    // THEN
    assert_eq!(session, test_session());
}

/// **VALUE**: A rejection surfaces the server's own message verbatim.
///
/// **WHY THIS MATTERS**: The operator sees this text in the status line; it
/// is the only hint whether the password or the account name was wrong.
#[tokio::test]
async fn given_rejected_credentials_when_authenticating_then_server_message_is_kept() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/user_auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "invalid credentials",
            "status": "error"
        })))
        .mount(&server)
        .await;

    // WHEN
    let error = client(&server)
        .authenticate(&credentials())
        .await
        .expect_err("Authentication should be rejected");

    // THEN
    match &error {
        CrossbarError::Rejected { status, message, .. } => {
            assert!(status.is_auth_rejection());
            assert_eq!(message, "invalid credentials");
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
    assert_eq!(error.operator_message(), "invalid credentials");
}

#[tokio::test]
async fn given_rejection_without_message_when_authenticating_then_status_and_body_reported() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/user_auth"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    // WHEN
    let error = client(&server)
        .authenticate(&credentials())
        .await
        .expect_err("Authentication should fail");

    // THEN
    assert_eq!(error.operator_message(), "HTTP 500 - boom");
}

#[tokio::test]
async fn given_malformed_success_body_when_authenticating_then_returns_json_error() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/user_auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(&server)
        .await;

    // WHEN
    let result = client(&server).authenticate(&credentials()).await;

    // THEN
    assert!(matches!(result, Err(CrossbarError::Json { .. })));
}

// ============================================================================
// CrossbarClient::quickcall()
// ============================================================================

/// **VALUE**: Verifies the quick-call path and that the session token is sent
/// as `X-Auth-Token`.
///
/// **BUG THIS CATCHES**: Would catch the token being sent in the URL or body,
/// or the owner and account ids appearing in the wrong path segments.
#[tokio::test]
async fn given_session_when_quickcall_then_token_header_and_path_are_used() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/accounts/acct-1/users/user-7/quickcall/1003"))
        .and(header("X-Auth-Token", TEST_AUTH_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "call-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN
    let call_info = client(&server)
        .quickcall(&test_session(), "1003")
        .await
        .expect("Quick call should succeed");

    // THEN
    assert_eq!(call_info["data"]["id"], "call-1");
}

#[test]
fn given_base_url_without_trailing_slash_when_creating_client_then_slash_is_added() {
    let client = CrossbarClient::new("https://pbx.example.com:8443/v2").expect("URL should parse");

    assert_eq!(client.base_url().as_str(), "https://pbx.example.com:8443/v2/");
}

#[test]
fn given_invalid_base_url_when_creating_client_then_returns_url_parse_error() {
    let result = CrossbarClient::new("not a url");

    assert!(matches!(result, Err(CrossbarError::UrlParse { .. })));
}
