//! Async client core for a location-based venues API.
//!
//! # Overview
//! Turns calls such as `get_venue("abc123")` into signed HTTPS GET requests
//! and turns the JSON envelope that comes back into the requested payload
//! field or a typed [`ApiError`].
//!
//! # Design
//! - [`VenuesClient`] is immutable after construction; configuration errors
//!   surface from the constructor, before any network use.
//! - Each operation splits into `build_*` (an [`ApiCall`], no I/O) and
//!   [`VenuesClient::parse`], so callers can bring their own HTTP stack.
//!   The async methods join the two through a [`Transport`].
//! - [`Envelope`] classifies each response once: data, empty, failure, or
//!   unrecognized.
//! - Logging goes through `tracing`, routed to a `Dispatch` injected with
//!   [`VenuesClient::with_logger`]; by default nothing is emitted.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;

pub use client::{aspects, ApiCall, VenuesClient, DEFAULT_PHOTO_GROUP};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use envelope::{decode, Envelope, SUCCESS_CODE};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use params::{ParamValue, RequestParameters};
pub use transport::{HttpsTransport, RequestTarget, Transport};
