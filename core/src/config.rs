//! Client configuration: API base URL plus the application credentials that
//! are appended to every request.

use std::fmt;

use url::Url;

use crate::error::ApiError;

/// Base URL of the public v2 API.
pub const DEFAULT_API_URL: &str = "https://api.foursquare.com/v2";

/// Environment variable holding the client id.
pub const CLIENT_ID_VAR: &str = "FOURSQUARE_CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_VAR: &str = "FOURSQUARE_CLIENT_SECRET";
/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_VAR: &str = "FOURSQUARE_API_URL";

/// Settings captured by `VenuesClient` at construction. Immutable afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        api_base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Credentials against [`DEFAULT_API_URL`].
    pub fn with_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::new(DEFAULT_API_URL, client_id, client_secret)
    }

    /// Read the configuration from `FOURSQUARE_CLIENT_ID`,
    /// `FOURSQUARE_CLIENT_SECRET` and, optionally, `FOURSQUARE_API_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApiError::Configuration(format!("{name} is not set")))
        };
        let client_id = required(CLIENT_ID_VAR)?;
        let client_secret = required(CLIENT_SECRET_VAR)?;
        let api_base_url = lookup(API_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self::new(api_base_url, client_id, client_secret))
    }

    /// Check every field and return the parsed base URL.
    pub(crate) fn validate(&self) -> Result<Url, ApiError> {
        if self.client_id.trim().is_empty() {
            return Err(ApiError::Configuration("client_id is required".to_string()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ApiError::Configuration("client_secret is required".to_string()));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ApiError::Configuration("api_base_url is required".to_string()));
        }
        let url = Url::parse(self.api_base_url.trim()).map_err(|e| {
            ApiError::Configuration(format!(
                "api_base_url {:?} is not a valid URL: {e}",
                self.api_base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ApiError::Configuration(format!(
                "api_base_url {:?} must be an http or https URL",
                self.api_base_url
            )));
        }
        Ok(url)
    }
}
