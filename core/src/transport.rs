//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the only seam where I/O happens. `VenuesClient` holds one
//! as `Arc<dyn Transport>`, so tests swap in a canned implementation and
//! everything above this module stays deterministic. `HttpsTransport` is the
//! production implementation: one GET, the body streamed into a buffer, no
//! retries.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use crate::error::ApiError;
use crate::http::{redact_secret, HttpRequest, HttpResponse};

/// User agent sent by [`HttpsTransport`].
pub const DEFAULT_USER_AGENT: &str = concat!("foursquare-core/", env!("CARGO_PKG_VERSION"));

/// Performs a single GET round-trip.
///
/// Implementations resolve exactly once: with the complete response, or
/// with `ApiError::Transport` when no response could be read.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Where a request URL points.
///
/// Only `url` is handed to the HTTP client, which resolves the connection
/// itself; `host`, `port` and `path` describe the target in log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub url: Url,
    pub host: String,
    /// Explicit port, or the scheme default (443 for https, 80 for http).
    pub port: u16,
    /// Path plus query string.
    pub path: String,
}

impl RequestTarget {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let url = Url::parse(raw).map_err(ApiError::transport)?;
        let host = url
            .host_str()
            .ok_or_else(|| {
                ApiError::transport(format!("request URL has no host: {}", redact_secret(raw)))
            })?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| {
                ApiError::transport(format!("no default port for scheme {:?}", url.scheme()))
            })?;
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        Ok(Self {
            url,
            host,
            port,
            path,
        })
    }
}

/// `reqwest`-backed transport over http and https (rustls).
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    client: Client,
}

impl HttpsTransport {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpsTransport {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let target = RequestTarget::parse(&request.url)?;
        debug!(
            host = %target.host,
            port = target.port,
            path = %redact_secret(&target.path),
            "requesting"
        );

        let mut builder = self.client.get(target.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            error!(host = %target.host, error = %e, "error calling remote host");
            ApiError::transport(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                error!(host = %target.host, error = %e, "response stream failed");
                ApiError::transport(e)
            })?;
            body.extend_from_slice(&chunk);
        }
        debug!(status, bytes = body.len(), "response complete");

        let body = String::from_utf8(body).map_err(|e| {
            error!(host = %target.host, status, error = %e, "response body is not UTF-8");
            ApiError::malformed_body(e)
        })?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
