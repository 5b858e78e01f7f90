//! Verify identifier resolution and response normalization against the JSON
//! test vectors stored in `test-vectors/`.
//!
//! Payloads are compared as parsed JSON, not raw strings, so field ordering
//! never causes false negatives.

use paste_core::{normalize_value, resolve_id, resolve_password, ErrorKind, HostPattern, IdInput};

/// Parse the error kind names used in the vector files.
fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "MissingIdentifier" => ErrorKind::MissingIdentifier,
        "InvalidIdentifierType" => ErrorKind::InvalidIdentifierType,
        "NotAuthorized" => ErrorKind::NotAuthorized,
        "NotFound" => ErrorKind::NotFound,
        "RemoteError" => ErrorKind::RemoteError,
        other => panic!("unknown error kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[test]
fn identifier_test_vectors() {
    let raw = include_str!("../../test-vectors/identifiers.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let hosts = HostPattern::new(vectors["host_pattern"].as_str().unwrap()).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let input = match IdInput::try_from(&case["input"]) {
            Ok(input) => input,
            Err(err) => {
                // Both resolvers consume the same value, so a rejected input
                // must fail the same way for id and password.
                let expected = parse_kind(case["expected_error"].as_str().unwrap());
                assert_eq!(err.kind(), expected, "{name}: input conversion");
                let expected = parse_kind(case["expected_password_error"].as_str().unwrap());
                assert_eq!(err.kind(), expected, "{name}: password input conversion");
                continue;
            }
        };

        // Verify id
        match case["expected_error"].as_str() {
            Some(kind) => {
                let err = resolve_id(&input, &hosts).unwrap_err();
                assert_eq!(err.kind(), parse_kind(kind), "{name}: id error");
            }
            None => {
                let id = resolve_id(&input, &hosts).unwrap();
                assert_eq!(id, case["expected_id"].as_str().unwrap(), "{name}: id");
                assert_eq!(resolve_id(&input, &hosts).unwrap(), id, "{name}: idempotent");
            }
        }

        // Verify password, from the string and from the parsed URL
        if let IdInput::Raw(raw) = &input {
            if let Ok(url) = url::Url::parse(raw) {
                if url.host_str().is_some() {
                    let from_url = resolve_password(&IdInput::Url(url)).unwrap();
                    assert_eq!(
                        from_url.as_deref(),
                        case["expected_password"].as_str(),
                        "{name}: password from parsed url"
                    );
                }
            }
        }
        match case["expected_password_error"].as_str() {
            Some(kind) => {
                let err = resolve_password(&input).unwrap_err();
                assert_eq!(err.kind(), parse_kind(kind), "{name}: password error");
            }
            None => {
                let password = resolve_password(&input).unwrap();
                assert_eq!(
                    password.as_deref(),
                    case["expected_password"].as_str(),
                    "{name}: password"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn normalize_test_vectors() {
    let raw = include_str!("../../test-vectors/normalize.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();

        let result = normalize_value(status, body, Some("/api/test"));
        match case.get("expected_data") {
            Some(expected) => {
                assert_eq!(&result.unwrap(), expected, "{name}: payload");
            }
            None => {
                let err = result.unwrap_err();
                let expected = &case["expected_error"];
                assert_eq!(
                    err.kind(),
                    parse_kind(expected["kind"].as_str().unwrap()),
                    "{name}: kind"
                );
                assert_eq!(err.message(), expected["message"].as_str().unwrap(), "{name}: message");
                assert_eq!(err.status(), Some(status), "{name}: status");
                assert_eq!(err.path(), Some("/api/test"), "{name}: path");
            }
        }
    }
}
