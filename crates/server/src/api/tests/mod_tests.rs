use super::*;

#[test]
fn blank_mode_defaults_to_offline() {
    assert_eq!(parse_mode("").expect("mode"), EventMode::Offline);
    assert_eq!(parse_mode("   ").expect("mode"), EventMode::Offline);
}

#[test]
fn mode_is_parsed_case_insensitively() {
    assert_eq!(parse_mode("Online").expect("mode"), EventMode::Online);
    assert_eq!(parse_mode("hybrid").expect("mode"), EventMode::Hybrid);
}

#[test]
fn unknown_mode_is_a_validation_error() {
    let err = parse_mode("virtual").expect_err("must fail");
    assert!(matches!(err.code, ErrorCode::Validation));
    assert_eq!(err.message, "unknown mode 'virtual'");
}

#[test]
fn rejection_maps_error_codes_to_statuses() {
    let cases = [
        (ErrorCode::Validation, StatusCode::BAD_REQUEST),
        (ErrorCode::NotFound, StatusCode::NOT_FOUND),
        (ErrorCode::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
        (ErrorCode::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        (ErrorCode::Internal, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let (actual, Json(body)) = rejection(ApiException::new(code, "boom"));
        assert_eq!(actual, status);
        assert_eq!(body.code, code);
        assert_eq!(body.message, "boom");
    }
}
