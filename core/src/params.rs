//! Query parameters for a single API call.
//!
//! # Design
//! `RequestParameters` keeps insertion order and is never mutated by the
//! client. `to_query_pairs` produces a fresh list with the location pair
//! collapsed into `ll`, so the same parameter set can be reused across calls.

use std::fmt;

use serde::Deserialize;

use crate::error::ApiError;

const LAT: &str = "lat";
const LNG: &str = "lng";
const LL: &str = "ll";

pub(crate) const CLIENT_ID: &str = "client_id";
pub(crate) const CLIENT_SECRET: &str = "client_secret";

/// A scalar query value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Ordered key/value pairs sent as the query string of one call.
///
/// Setting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParameters {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RequestParameters::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set both `lat` and `lng`.
    pub fn with_location(self, lat: impl Into<ParamValue>, lng: impl Into<ParamValue>) -> Self {
        self.with(LAT, lat).with(LNG, lng)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render the parameters as query pairs.
    ///
    /// `lat` and `lng` must be given together; when present they are removed
    /// and a single `ll=<lat>,<lng>` pair is appended after the remaining
    /// parameters. Credential keys are rejected; the client appends its own.
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, ApiError> {
        if let Some(key) = [CLIENT_ID, CLIENT_SECRET].into_iter().find(|k| self.contains(k)) {
            return Err(ApiError::Validation(format!(
                "parameters: {key} is taken from the client configuration"
            )));
        }

        let location = match (self.get(LAT), self.get(LNG)) {
            (Some(lat), Some(lng)) => Some(format!("{lat},{lng}")),
            (None, None) => None,
            _ => {
                return Err(ApiError::Validation(
                    "parameters: if you specify a longitude or latitude, you must include BOTH"
                        .to_string(),
                ))
            }
        };

        let mut pairs: Vec<(String, String)> = self
            .iter()
            .filter(|(k, _)| location.is_none() || (*k != LAT && *k != LNG))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(ll) = location {
            match pairs.iter_mut().find(|(k, _)| k == LL) {
                Some(existing) => existing.1 = ll,
                None => pairs.push((LL.to_string(), ll)),
            }
        }
        Ok(pairs)
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParameters
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}
