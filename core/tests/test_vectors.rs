//! Verify build/parse pairs against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation and its inputs, the expected request URL, a
//! simulated response, and either the decoded payload or the error kind.
//! Payloads are compared as parsed JSON so field order does not matter.

use foursquare_core::{
    ApiCall, ApiError, ClientConfig, HttpResponse, ParamValue, RequestParameters, VenuesClient,
};
use serde_json::Value;

const BASE_URL: &str = "https://api.example.test/v2";

fn client() -> VenuesClient {
    VenuesClient::new(ClientConfig::new(BASE_URL, "id", "secret")).unwrap()
}

/// `[["key", value], ...]` into `RequestParameters`; `null` or absent means no params.
fn params(case: &Value) -> Option<RequestParameters> {
    let pairs = case.get("params")?.as_array()?;
    Some(
        pairs
            .iter()
            .map(|pair| {
                let key = pair[0].as_str().unwrap().to_string();
                let value: ParamValue = serde_json::from_value(pair[1].clone()).unwrap();
                (key, value)
            })
            .collect(),
    )
}

fn arg<'a>(case: &'a Value, name: &str) -> &'a str {
    case[name].as_str().unwrap_or_else(|| panic!("case is missing {name}"))
}

fn build(c: &VenuesClient, case: &Value) -> Result<ApiCall, ApiError> {
    let params = params(case);
    let params = params.as_ref();
    match arg(case, "operation") {
        "search_venues" => c.build_search_venues(params),
        "trending_venues" => c.build_trending_venues(params),
        "get_venue" => c.build_get_venue(arg(case, "venue_id")),
        "get_venue_aspect" => {
            c.build_get_venue_aspect(arg(case, "venue_id"), arg(case, "aspect"), params)
        }
        "get_photos" => c.build_get_photos(arg(case, "venue_id"), case["group"].as_str(), params),
        "get_tip" => c.build_get_tip(arg(case, "tip_id")),
        "search_tips" => c.build_search_tips(params),
        other => panic!("unknown operation: {other}"),
    }
}

fn check_error(name: &str, err: &ApiError, expected: &Value) {
    let kind = expected["kind"].as_str().unwrap();
    let matched = match kind {
        "NonSuccessStatus" => matches!(err, ApiError::NonSuccessStatus { .. }),
        "MalformedBody" => matches!(err, ApiError::MalformedBody(_)),
        "MalformedEnvelope" => matches!(err, ApiError::MalformedEnvelope(_)),
        "Validation" => matches!(err, ApiError::Validation(_)),
        other => panic!("{name}: unknown expected_error kind: {other}"),
    };
    assert!(matched, "{name}: expected {kind}, got {err:?}");

    if let Some(code) = expected.get("code") {
        assert_eq!(err.status_code(), code.as_i64(), "{name}: status code");
    }
    if let Some(message) = expected.get("message") {
        assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: message");
    }
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let c = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = arg(case, "name");

        if let Some(kind) = case.get("expected_build_error") {
            let err = build(&c, case).unwrap_err();
            check_error(name, &err, &serde_json::json!({ "kind": kind }));
            continue;
        }

        // Verify build
        let call = build(&c, case).unwrap();
        let expected_req = &case["expected_request"];
        let expected_url = format!(
            "{BASE_URL}{}?{}",
            arg(expected_req, "path"),
            arg(expected_req, "query"),
        );
        assert_eq!(call.request.url, expected_url, "{name}: url");
        assert_eq!(
            call.request.headers,
            vec![("content-length".to_string(), "0".to_string())],
            "{name}: headers"
        );

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(sim["status"].as_u64().unwrap() as u16, arg(sim, "body"));
        let result = c.parse(&call, response);

        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error);
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}

#[test]
fn venue_test_vectors() {
    run_vectors(include_str!("../../test-vectors/venues.json"));
}

#[test]
fn tip_test_vectors() {
    run_vectors(include_str!("../../test-vectors/tips.json"));
}
