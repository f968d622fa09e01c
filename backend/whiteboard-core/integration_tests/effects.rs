use crate::helpers::test_session;

use whiteboard_core::crossbar::CrossbarClient;
use whiteboard_core::effects::{AudioAlert, CallPlacement, QuickCall, SoundCommand};
use whiteboard_core::error::effects::EffectError;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: The call effect hits the configured extension for the session's
/// owner.
#[tokio::test]
async fn given_quickcall_effect_when_placing_call_then_extension_is_dialled() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/accounts/acct-1/users/user-7/quickcall/2001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;
    let client = CrossbarClient::new(&format!("{}/v2/", server.uri())).expect("URL should parse");

    // WHEN
    let result = QuickCall::new(client, "2001").place_call(test_session()).await;

    // THEN
    assert!(result.is_ok(), "Call should be placed: {result:?}");
}

#[tokio::test]
async fn given_crossbar_refuses_when_placing_call_then_returns_call_placement_error() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .mount(&server)
        .await;
    let client = CrossbarClient::new(&server.uri()).expect("URL should parse");

    // WHEN
    let result = QuickCall::new(client, "1003").place_call(test_session()).await;

    // THEN
    assert!(matches!(result, Err(EffectError::CallPlacement { .. })));
}

#[tokio::test]
async fn given_no_player_configured_when_alerting_then_succeeds_silently() {
    let result = SoundCommand::default().play_alert().await;

    assert!(result.is_ok());
}

/// **VALUE**: A player that fails is reported, not ignored.
///
/// **WHY THIS MATTERS**: The failure is only logged, but it has to be logged;
/// otherwise a misconfigured player looks identical to an accepted stroke.
#[cfg(unix)]
#[tokio::test]
async fn given_failing_player_when_alerting_then_returns_alert_player_error() {
    let result = SoundCommand::new(Some("false".to_string()), Vec::new())
        .play_alert()
        .await;

    assert!(matches!(result, Err(EffectError::AlertPlayer { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn given_missing_player_binary_when_alerting_then_returns_alert_player_error() {
    let result = SoundCommand::new(Some("/nonexistent/whiteboard-player".to_string()), Vec::new())
        .play_alert()
        .await;

    assert!(matches!(result, Err(EffectError::AlertPlayer { .. })));
}
