//! Endpoint façade for the venues API.
//!
//! # Design
//! `VenuesClient` holds the validated base URL, the credentials, a
//! `Transport` and a logging dispatch; nothing changes after construction,
//! so clones can be shared across tasks freely. Every operation is split the
//! same way:
//!
//! - `build_*` validates arguments and produces an [`ApiCall`]: the GET
//!   request plus the envelope field the operation expects back. No I/O.
//! - [`VenuesClient::parse`] decodes an `HttpResponse` for that call.
//! - The async method (`get_venue`, `search_venues`, ...) runs
//!   build → transport → parse under the injected logger.
//!
//! Callers that execute requests themselves only need the first two.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::instrument::WithSubscriber;
use tracing::{trace, warn, Dispatch};
use url::Url;

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::{RequestParameters, CLIENT_ID, CLIENT_SECRET};
use crate::transport::{HttpsTransport, Transport};

/// Photo group requested when neither the argument nor the parameters name one.
pub const DEFAULT_PHOTO_GROUP: &str = "checkin";

/// Venue aspects with dedicated helpers.
pub mod aspects {
    pub const HERE_NOW: &str = "herenow";
    pub const TIPS: &str = "tips";
    pub const PHOTOS: &str = "photos";
    pub const LINKS: &str = "links";
}

/// A fully built request and the response field it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub request: HttpRequest,
    pub field: String,
}

/// Client for the venues and tips endpoints.
#[derive(Clone)]
pub struct VenuesClient {
    base_url: Url,
    client_id: String,
    client_secret: String,
    transport: Arc<dyn Transport>,
    logger: Dispatch,
}

impl fmt::Debug for VenuesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenuesClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("transport", &"<dyn Transport>")
            .finish()
    }
}

impl VenuesClient {
    /// Validate `config` and build a client over [`HttpsTransport`].
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.validate()?;
        let transport = HttpsTransport::new()?;
        Ok(Self::assemble(base_url, config, Arc::new(transport)))
    }

    /// Validate `config` and build a client over a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        let base_url = config.validate()?;
        Ok(Self::assemble(base_url, config, transport))
    }

    fn assemble(base_url: Url, config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            client_id: config.client_id,
            client_secret: config.client_secret,
            transport,
            logger: Dispatch::none(),
        }
    }

    /// Route this client's log events to `logger`. Without it the client
    /// emits nothing.
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = logger.into();
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // -----------------------------------------------------------------------
    // Shared pipeline
    // -----------------------------------------------------------------------

    /// Build the request for `{base}/{segments...}` expecting `field`.
    ///
    /// Each segment is percent-encoded on its own. Parameters come first in
    /// the query, credentials last. `None` sends the credentials only.
    pub fn build_call(
        &self,
        segments: &[&str],
        field: &str,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        let pairs = match params {
            Some(params) => params.to_query_pairs()?,
            None => Vec::new(),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Configuration("api_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair(CLIENT_ID, &self.client_id)
            .append_pair(CLIENT_SECRET, &self.client_secret);

        let request = HttpRequest::get(url.as_str());
        trace!(url = %request.redacted_url(), field, "built request");
        Ok(ApiCall {
            request,
            field: field.to_string(),
        })
    }

    /// Decode `response` for `call`.
    pub fn parse(&self, call: &ApiCall, response: HttpResponse) -> Result<Value, ApiError> {
        envelope::decode(&response, &call.field)
    }

    /// Run `build` and, if it succeeds, the round-trip, with every log
    /// event going to the injected logger.
    async fn execute<F>(&self, build: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Result<ApiCall, ApiError>,
    {
        async move {
            let call = build().inspect_err(|e| warn!(error = %e, "request rejected"))?;
            let response = self.transport.fetch(&call.request).await?;
            self.parse(&call, response)
        }
        .with_subscriber(self.logger.clone())
        .await
    }

    // -----------------------------------------------------------------------
    // Venues
    // -----------------------------------------------------------------------

    pub fn build_search_venues(
        &self,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        self.build_call(&["venues", "search"], "groups", params)
    }

    /// Search venues. Typically called with a location (`lat`/`lng`) and a
    /// `query`; resolves to the `groups` array.
    pub async fn search_venues(
        &self,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.execute(|| self.build_search_venues(params)).await
    }

    pub fn build_trending_venues(
        &self,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        self.build_call(&["venues", "trending"], "venues", params)
    }

    /// Venues near a location with the most people currently checked in.
    pub async fn trending_venues(
        &self,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.execute(|| self.build_trending_venues(params)).await
    }

    pub fn build_get_venue(&self, venue_id: &str) -> Result<ApiCall, ApiError> {
        require("get_venue", "venue_id", venue_id)?;
        self.build_call(&["venues", venue_id], "venue", None)
    }

    pub async fn get_venue(&self, venue_id: &str) -> Result<Value, ApiError> {
        self.execute(|| self.build_get_venue(venue_id)).await
    }

    pub fn build_get_venue_aspect(
        &self,
        venue_id: &str,
        aspect: &str,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        require("get_venue_aspect", "venue_id", venue_id)?;
        require("get_venue_aspect", "aspect", aspect)?;
        self.build_call(&["venues", venue_id, aspect], aspect, params)
    }

    /// Fetch `/venues/{venue_id}/{aspect}`; the aspect name doubles as the
    /// response field.
    pub async fn get_venue_aspect(
        &self,
        venue_id: &str,
        aspect: &str,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.execute(|| self.build_get_venue_aspect(venue_id, aspect, params)).await
    }

    pub fn build_get_here_now(
        &self,
        venue_id: &str,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        self.build_get_venue_aspect(venue_id, aspects::HERE_NOW, params)
    }

    /// Check-ins of users currently at the venue.
    pub async fn get_here_now(
        &self,
        venue_id: &str,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.get_venue_aspect(venue_id, aspects::HERE_NOW, params).await
    }

    pub fn build_get_tips(
        &self,
        venue_id: &str,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        self.build_get_venue_aspect(venue_id, aspects::TIPS, params)
    }

    pub async fn get_tips(
        &self,
        venue_id: &str,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.get_venue_aspect(venue_id, aspects::TIPS, params).await
    }

    pub fn build_get_photos(
        &self,
        venue_id: &str,
        group: Option<&str>,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        let params = photo_params(group, params);
        self.build_get_venue_aspect(venue_id, aspects::PHOTOS, Some(&params))
    }

    /// Photos of a venue. `group` wins over a `group` key in `params`;
    /// with neither, [`DEFAULT_PHOTO_GROUP`] is requested.
    pub async fn get_photos(
        &self,
        venue_id: &str,
        group: Option<&str>,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.execute(|| self.build_get_photos(venue_id, group, params)).await
    }

    pub fn build_get_links(
        &self,
        venue_id: &str,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        self.build_get_venue_aspect(venue_id, aspects::LINKS, params)
    }

    pub async fn get_links(
        &self,
        venue_id: &str,
        params: Option<&RequestParameters>,
    ) -> Result<Value, ApiError> {
        self.get_venue_aspect(venue_id, aspects::LINKS, params).await
    }

    // -----------------------------------------------------------------------
    // Tips
    // -----------------------------------------------------------------------

    pub fn build_get_tip(&self, tip_id: &str) -> Result<ApiCall, ApiError> {
        require("get_tip", "tip_id", tip_id)?;
        self.build_call(&["tips", tip_id], "tip", None)
    }

    pub async fn get_tip(&self, tip_id: &str) -> Result<Value, ApiError> {
        self.execute(|| self.build_get_tip(tip_id)).await
    }

    pub fn build_search_tips(
        &self,
        params: Option<&RequestParameters>,
    ) -> Result<ApiCall, ApiError> {
        self.build_call(&["tips", "search"], "tips", params)
    }

    pub async fn search_tips(&self, params: Option<&RequestParameters>) -> Result<Value, ApiError> {
        self.execute(|| self.build_search_tips(params)).await
    }
}

fn require(operation: &str, name: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{operation}: {name} is required")));
    }
    Ok(())
}

fn photo_params(group: Option<&str>, params: Option<&RequestParameters>) -> RequestParameters {
    let mut params = params.cloned().unwrap_or_default();
    match group {
        Some(group) => params.set("group", group),
        None if !params.contains("group") => params.set("group", DEFAULT_PHOTO_GROUP),
        None => {}
    }
    params
}
