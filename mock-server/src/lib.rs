use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const VENUE_ID: &str = "40a55d80f964a52020f31ee3";
pub const LEGACY_VENUE_ID: &str = "5104";
pub const QUIET_VENUE_ID: &str = "4b0588f1f964a52079c525e3";
pub const TIP_ID: &str = "4b5e662a70c603bba7d790b4";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub location: Location,
    pub here_now: HereNow,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HereNow {
    pub count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: String,
    pub text: String,
    pub venue_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: String,
    pub group: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub provider: String,
    pub url: String,
}

/// Seed data served by the mock.
#[derive(Debug, Default)]
pub struct Fixtures {
    pub venues: Vec<Venue>,
    pub tips: Vec<Tip>,
    pub photos: HashMap<String, Vec<Photo>>,
    pub links: HashMap<String, Vec<Link>>,
    pub legacy_ids: HashMap<String, String>,
}

impl Fixtures {
    pub fn seeded() -> Self {
        let venues = vec![
            Venue {
                id: VENUE_ID.to_string(),
                name: "Clinton St. Baking Co.".to_string(),
                location: Location {
                    address: "4 Clinton St".to_string(),
                    lat: 40.721,
                    lng: -73.984,
                },
                here_now: HereNow { count: 7 },
            },
            Venue {
                id: QUIET_VENUE_ID.to_string(),
                name: "Bowling Green Park".to_string(),
                location: Location {
                    address: "Broadway & Whitehall St".to_string(),
                    lat: 40.705,
                    lng: -74.013,
                },
                here_now: HereNow { count: 0 },
            },
        ];
        let tips = vec![
            Tip {
                id: TIP_ID.to_string(),
                text: "Blueberry pancakes are worth the wait.".to_string(),
                venue_id: VENUE_ID.to_string(),
            },
            Tip {
                id: "4c2b7e1d8c9f2d7f3b4a5c6e".to_string(),
                text: "Quiet spot for lunch on a weekday.".to_string(),
                venue_id: QUIET_VENUE_ID.to_string(),
            },
        ];
        let photos = HashMap::from([(
            VENUE_ID.to_string(),
            vec![
                Photo {
                    id: "p1".to_string(),
                    group: "checkin".to_string(),
                    url: "https://img.example/p1.jpg".to_string(),
                },
                Photo {
                    id: "p2".to_string(),
                    group: "venue".to_string(),
                    url: "https://img.example/p2.jpg".to_string(),
                },
            ],
        )]);
        let links = HashMap::from([(
            VENUE_ID.to_string(),
            vec![Link {
                provider: "menupages".to_string(),
                url: "https://menus.example/clinton-st".to_string(),
            }],
        )]);
        let legacy_ids = HashMap::from([(LEGACY_VENUE_ID.to_string(), VENUE_ID.to_string())]);
        Self {
            venues,
            tips,
            photos,
            links,
            legacy_ids,
        }
    }

    pub fn venue(&self, id: &str) -> Option<&Venue> {
        let id = self.legacy_ids.get(id).map_or(id, String::as_str);
        self.venues.iter().find(|v| v.id == id)
    }

    pub fn tip(&self, id: &str) -> Option<&Tip> {
        self.tips.iter().find(|t| t.id == id)
    }
}

pub type Db = Arc<Fixtures>;
type Params = HashMap<String, String>;

pub fn app() -> Router {
    app_with(Fixtures::seeded())
}

pub fn app_with(fixtures: Fixtures) -> Router {
    let db: Db = Arc::new(fixtures);
    Router::new()
        .route("/v2/venues/search", get(search_venues))
        .route("/v2/venues/trending", get(trending_venues))
        .route("/v2/venues/{id}", get(get_venue))
        .route("/v2/venues/{id}/{aspect}", get(get_venue_aspect))
        .route("/v2/tips/search", get(search_tips))
        .route("/v2/tips/{id}", get(get_tip))
        .route("/v2/outage", get(outage))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Envelope helpers
// ---------------------------------------------------------------------------

fn ok(field: &str, value: Value) -> Response {
    let mut response = serde_json::Map::new();
    response.insert(field.to_string(), value);
    Json(json!({ "meta": { "code": 200 }, "response": response })).into_response()
}

fn fail(status: StatusCode, error_type: &str, detail: &str) -> Response {
    let body = json!({
        "meta": {
            "code": status.as_u16(),
            "errorType": error_type,
            "errorDetail": detail,
        },
        "response": {},
    });
    (status, Json(body)).into_response()
}

fn authorize(params: &Params) -> Result<(), Response> {
    let present = |key: &str| params.get(key).is_some_and(|v| !v.is_empty());
    if present("client_id") && present("client_secret") {
        return Ok(());
    }
    Err(fail(
        StatusCode::UNAUTHORIZED,
        "invalid_auth",
        "Missing access credentials.",
    ))
}

/// Read `ll` as `(lat, lng)`; raw `lat`/`lng` keys are not accepted.
fn require_ll(params: &Params) -> Result<(f64, f64), Response> {
    for stray in ["lat", "lng"] {
        if params.contains_key(stray) {
            return Err(fail(
                StatusCode::BAD_REQUEST,
                "param_error",
                &format!("Unexpected parameter {stray}; use ll"),
            ));
        }
    }
    let ll = params.get("ll").ok_or_else(|| {
        fail(StatusCode::BAD_REQUEST, "param_error", "Must provide parameter ll")
    })?;
    let parsed = ll
        .split_once(',')
        .and_then(|(lat, lng)| Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?)));
    parsed.ok_or_else(|| {
        fail(
            StatusCode::BAD_REQUEST,
            "param_error",
            &format!("Invalid geo coordinates ({ll})"),
        )
    })
}

fn limit(params: &Params) -> usize {
    params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(usize::MAX)
}

fn unknown_id(kind: &str, id: &str) -> Response {
    fail(
        StatusCode::BAD_REQUEST,
        "param_error",
        &format!("Value {id} is invalid for {kind} id"),
    )
}

/// Squared degree distance; good enough to order fixtures.
fn distance(venue: &Venue, (lat, lng): (f64, f64)) -> f64 {
    (venue.location.lat - lat).powi(2) + (venue.location.lng - lng).powi(2)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn search_venues(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    if let Err(response) = authorize(&params) {
        return response;
    }
    let origin = match require_ll(&params) {
        Ok(origin) => origin,
        Err(response) => return response,
    };
    let query = params.get("query").map(|q| q.to_lowercase());
    let mut items: Vec<&Venue> = db
        .venues
        .iter()
        .filter(|v| query.as_ref().map_or(true, |q| v.name.to_lowercase().contains(q)))
        .collect();
    items.sort_by(|a, b| distance(a, origin).total_cmp(&distance(b, origin)));
    items.truncate(limit(&params));
    ok(
        "groups",
        json!([{ "type": "nearby", "name": "Nearby", "items": items }]),
    )
}

async fn trending_venues(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    if let Err(response) = authorize(&params) {
        return response;
    }
    if let Err(response) = require_ll(&params) {
        return response;
    }
    let mut venues: Vec<&Venue> = db.venues.iter().filter(|v| v.here_now.count > 0).collect();
    venues.sort_by(|a, b| b.here_now.count.cmp(&a.here_now.count));
    venues.truncate(limit(&params));
    ok("venues", json!(venues))
}

async fn get_venue(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(response) = authorize(&params) {
        return response;
    }
    match db.venue(&id) {
        Some(venue) => ok("venue", json!(venue)),
        None => unknown_id("venue", &id),
    }
}

async fn get_venue_aspect(
    State(db): State<Db>,
    Path((id, aspect)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(response) = authorize(&params) {
        return response;
    }
    let Some(venue) = db.venue(&id) else {
        return unknown_id("venue", &id);
    };
    let items = match aspect.as_str() {
        "herenow" => json!([]),
        "tips" => json!(db.tips.iter().filter(|t| t.venue_id == venue.id).collect::<Vec<_>>()),
        "photos" => {
            let Some(group) = params.get("group") else {
                return fail(StatusCode::BAD_REQUEST, "param_error", "Must provide parameter group");
            };
            let photos = db.photos.get(&venue.id).map(Vec::as_slice).unwrap_or_default();
            json!(photos.iter().filter(|p| &p.group == group).collect::<Vec<_>>())
        }
        "links" => json!(db.links.get(&venue.id).cloned().unwrap_or_default()),
        _ => return fail(StatusCode::NOT_FOUND, "endpoint_error", "Endpoint not found"),
    };
    let count = match aspect.as_str() {
        "herenow" => venue.here_now.count as usize,
        _ => items.as_array().map_or(0, Vec::len),
    };
    ok(&aspect, json!({ "count": count, "items": items }))
}

async fn get_tip(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(response) = authorize(&params) {
        return response;
    }
    match db.tip(&id) {
        Some(tip) => ok("tip", json!(tip)),
        None => unknown_id("tip", &id),
    }
}

async fn search_tips(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    if let Err(response) = authorize(&params) {
        return response;
    }
    if let Err(response) = require_ll(&params) {
        return response;
    }
    let query = params.get("query").map(|q| q.to_lowercase());
    let mut tips: Vec<&Tip> = db
        .tips
        .iter()
        .filter(|t| query.as_ref().map_or(true, |q| t.text.to_lowercase().contains(q)))
        .collect();
    tips.truncate(limit(&params));
    ok("tips", json!(tips))
}

async fn outage() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body><h1>503 Service Unavailable</h1></body></html>",
    )
        .into_response()
}
