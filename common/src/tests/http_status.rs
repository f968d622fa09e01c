// Unit tests for HttpStatusCode classification

use crate::HttpStatusCode;

#[test]
fn given_status_codes_when_classified_then_ranges_are_exclusive() {
    let ok = HttpStatusCode::from(201);
    let unauthorized = HttpStatusCode::from(401);
    let unavailable = HttpStatusCode::from(503);

    assert!(ok.is_success() && !ok.is_client_error() && !ok.is_server_error());
    assert!(unauthorized.is_client_error() && unauthorized.is_auth_rejection());
    assert!(unavailable.is_server_error() && !unavailable.is_auth_rejection());
}

/// **VALUE**: Only 401 and 403 count as credential rejections.
///
/// **BUG THIS CATCHES**: Would catch a 404 from a mistyped crossbar URL being
/// reported to the operator as a wrong password.
#[test]
fn given_not_found_when_classified_then_not_an_auth_rejection() {
    let not_found = HttpStatusCode(404);

    assert!(not_found.is_client_error());
    assert!(!not_found.is_auth_rejection());
    assert_eq!(not_found.to_string(), "404");
}
