//! HTTP request/response as plain data.
//!
//! # Design
//! The client describes every call as an `HttpRequest` value and decodes an
//! `HttpResponse` value; executing the round-trip is the job of a
//! [`Transport`](crate::transport::Transport) or of the caller's own HTTP
//! stack. The API is read-only, so every request is a GET without a body.
//!
//! All fields use owned types so values can be handed to any executor.

use url::form_urlencoded;

use crate::params::CLIENT_SECRET;

const REDACTED: &str = "***";

/// Header sent with every request.
pub const CONTENT_LENGTH_ZERO: (&str, &str) = ("content-length", "0");

/// A GET request described as plain data.
///
/// `url` is absolute and already carries the query string, credentials
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: vec![(
                CONTENT_LENGTH_ZERO.0.to_string(),
                CONTENT_LENGTH_ZERO.1.to_string(),
            )],
        }
    }

    /// The URL with the `client_secret` value masked, for logs.
    pub fn redacted_url(&self) -> String {
        redact_secret(&self.url)
    }
}

/// An HTTP response described as plain data.
///
/// The body is the full payload, buffered in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mask the value of every query pair named exactly `client_secret`.
///
/// Accepts a full URL or a path with a query string. The query is
/// re-serialized as form-urlencoded.
pub(crate) fn redact_secret(url: &str) -> String {
    let Some((head, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let mut masked = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == CLIENT_SECRET {
            masked.append_pair(&key, REDACTED);
        } else {
            masked.append_pair(&key, &value);
        }
    }
    format!("{head}?{}", masked.finish())
}
