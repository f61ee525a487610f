use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Tip, Venue, LEGACY_VENUE_ID, TIP_ID, VENUE_ID};
use serde_json::Value;
use tower::ServiceExt;

const CREDS: &str = "client_id=id&client_secret=secret";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn get(uri: &str) -> axum::response::Response {
    app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap()
}

// --- credentials ---

#[tokio::test]
async fn missing_credentials_returns_401_envelope() {
    let resp = get(&format!("/v2/venues/{VENUE_ID}?client_id=id")).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["code"], 401);
    assert_eq!(body["meta"]["errorType"], "invalid_auth");
}

// --- venues ---

#[tokio::test]
async fn get_venue_wraps_payload_in_envelope() {
    let resp = get(&format!("/v2/venues/{VENUE_ID}?{CREDS}")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["code"], 200);
    let venue: Venue = serde_json::from_value(body["response"]["venue"].clone()).unwrap();
    assert_eq!(venue.id, VENUE_ID);
}

#[tokio::test]
async fn legacy_venue_id_resolves() {
    let resp = get(&format!("/v2/venues/{LEGACY_VENUE_ID}?{CREDS}")).await;

    let body = body_json(resp).await;
    assert_eq!(body["response"]["venue"]["id"], VENUE_ID);
}

#[tokio::test]
async fn unknown_venue_returns_param_error() {
    let resp = get(&format!("/v2/venues/nope?{CREDS}")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["code"], 400);
    assert_eq!(body["meta"]["errorDetail"], "Value nope is invalid for venue id");
}

#[tokio::test]
async fn search_requires_ll() {
    let resp = get(&format!("/v2/venues/search?query=park&{CREDS}")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["errorDetail"], "Must provide parameter ll");
}

#[tokio::test]
async fn search_rejects_raw_lat_lng() {
    let resp = get(&format!("/v2/venues/search?lat=40.7&lng=-74&{CREDS}")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_filters_by_query() {
    let resp = get(&format!("/v2/venues/search?query=bowling&ll=40.7%2C-74&{CREDS}")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let groups = body["response"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    let items = groups[0]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Bowling Green Park");
}

#[tokio::test]
async fn trending_only_lists_occupied_venues() {
    let resp = get(&format!("/v2/venues/trending?ll=40.7%2C-74&{CREDS}")).await;

    let body = body_json(resp).await;
    let venues = body["response"]["venues"].as_array().unwrap();
    assert_eq!(venues.len(), 1);
    assert!(venues[0]["hereNow"]["count"].as_u64().unwrap() > 0);
}

// --- aspects ---

#[tokio::test]
async fn aspect_payload_is_keyed_by_aspect_name() {
    for aspect in ["herenow", "tips", "links"] {
        let resp = get(&format!("/v2/venues/{VENUE_ID}/{aspect}?{CREDS}")).await;
        assert_eq!(resp.status(), StatusCode::OK, "{aspect}");
        let body = body_json(resp).await;
        assert!(body["response"][aspect]["count"].is_u64(), "{aspect}");
    }
}

#[tokio::test]
async fn photos_require_group() {
    let resp = get(&format!("/v2/venues/{VENUE_ID}/photos?{CREDS}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = get(&format!("/v2/venues/{VENUE_ID}/photos?group=venue&{CREDS}")).await;
    let body = body_json(resp).await;
    assert_eq!(body["response"]["photos"]["count"], 1);
    assert_eq!(body["response"]["photos"]["items"][0]["id"], "p2");
}

#[tokio::test]
async fn unknown_aspect_returns_404_envelope() {
    let resp = get(&format!("/v2/venues/{VENUE_ID}/menu?{CREDS}")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["code"], 404);
}

// --- tips ---

#[tokio::test]
async fn get_tip_returns_tip() {
    let resp = get(&format!("/v2/tips/{TIP_ID}?{CREDS}")).await;

    let body = body_json(resp).await;
    let tip: Tip = serde_json::from_value(body["response"]["tip"].clone()).unwrap();
    assert_eq!(tip.id, TIP_ID);
    assert_eq!(tip.venue_id, VENUE_ID);
}

#[tokio::test]
async fn search_tips_honours_limit() {
    let resp = get(&format!("/v2/tips/search?ll=40.7%2C-74&limit=1&{CREDS}")).await;

    let body = body_json(resp).await;
    assert_eq!(body["response"]["tips"].as_array().unwrap().len(), 1);
}

// --- outage ---

#[tokio::test]
async fn outage_serves_html() {
    let resp = get("/v2/outage").await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&body).is_err());
}
