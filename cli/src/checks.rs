//! The smoke checks: one per façade operation, each with a shape assertion
//! on the returned payload.

use clap::ValueEnum;
use foursquare_core::{ApiError, RequestParameters, VenuesClient};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Group {
    Venues,
    Tips,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    SearchVenues,
    Trending,
    Venue,
    HereNow,
    VenueTips,
    Photos,
    Links,
    Tip,
    SearchTips,
}

#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub group: Group,
    pub name: &'static str,
    pub kind: CheckKind,
}

pub const CHECKS: &[Check] = &[
    Check {
        group: Group::Venues,
        name: "search",
        kind: CheckKind::SearchVenues,
    },
    Check {
        group: Group::Venues,
        name: "trending",
        kind: CheckKind::Trending,
    },
    Check {
        group: Group::Venues,
        name: "venue",
        kind: CheckKind::Venue,
    },
    Check {
        group: Group::Venues,
        name: "here-now",
        kind: CheckKind::HereNow,
    },
    Check {
        group: Group::Venues,
        name: "tips",
        kind: CheckKind::VenueTips,
    },
    Check {
        group: Group::Venues,
        name: "photos",
        kind: CheckKind::Photos,
    },
    Check {
        group: Group::Venues,
        name: "links",
        kind: CheckKind::Links,
    },
    Check {
        group: Group::Tips,
        name: "tip",
        kind: CheckKind::Tip,
    },
    Check {
        group: Group::Tips,
        name: "search",
        kind: CheckKind::SearchTips,
    },
];

/// Fixture inputs shared by all checks.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub venue_id: String,
    pub expect_venue_id: Option<String>,
    pub tip_id: String,
    pub lat: String,
    pub lng: String,
}

impl Inputs {
    fn location(&self) -> RequestParameters {
        RequestParameters::new().with_location(self.lat.as_str(), self.lng.as_str())
    }
}

/// Checks matching the optional group and name filters, in catalog order.
pub fn select(group: Option<Group>, name: Option<&str>) -> Vec<Check> {
    CHECKS
        .iter()
        .filter(|c| group.map_or(true, |g| c.group == g))
        .filter(|c| name.map_or(true, |n| c.name == n))
        .copied()
        .collect()
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

pub async fn run(
    client: &VenuesClient,
    inputs: &Inputs,
    kind: CheckKind,
) -> Result<(), CheckError> {
    let location = inputs.location();
    let venue = inputs.venue_id.as_str();
    match kind {
        CheckKind::SearchVenues => {
            expect_non_empty_array(&client.search_venues(Some(&location)).await?)
        }
        CheckKind::Trending => expect_trending(&client.trending_venues(Some(&location)).await?),
        CheckKind::Venue => {
            let data = client.get_venue(venue).await?;
            let expected = inputs.expect_venue_id.as_deref().unwrap_or(venue);
            expect_id(&data, expected)
        }
        CheckKind::HereNow => expect_present(&client.get_here_now(venue, None).await?),
        CheckKind::VenueTips => expect_present(&client.get_tips(venue, None).await?),
        CheckKind::Photos => expect_present(&client.get_photos(venue, None, None).await?),
        CheckKind::Links => expect_present(&client.get_links(venue, None).await?),
        CheckKind::Tip => expect_id(&client.get_tip(&inputs.tip_id).await?, &inputs.tip_id),
        CheckKind::SearchTips => expect_present(&client.search_tips(Some(&location)).await?),
    }
}

fn expect_present(data: &Value) -> Result<(), CheckError> {
    if data.is_null() {
        return Err(CheckError::Assertion("payload is null".to_string()));
    }
    Ok(())
}

fn expect_non_empty_array(data: &Value) -> Result<(), CheckError> {
    match data.as_array() {
        Some(items) if !items.is_empty() => Ok(()),
        _ => Err(CheckError::Assertion(format!("expected a non-empty array, got {data}"))),
    }
}

fn expect_trending(data: &Value) -> Result<(), CheckError> {
    let count = data
        .as_array()
        .and_then(|venues| venues.first())
        .and_then(|venue| venue.pointer("/hereNow/count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if count == 0 {
        return Err(CheckError::Assertion(
            "first trending venue has nobody here now".to_string(),
        ));
    }
    Ok(())
}

fn expect_id(data: &Value, expected: &str) -> Result<(), CheckError> {
    match data.get("id").and_then(Value::as_str) {
        Some(id) if id == expected => Ok(()),
        other => Err(CheckError::Assertion(format!("expected id {expected}, got {other:?}"))),
    }
}
