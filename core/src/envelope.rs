//! Response envelope decoding.
//!
//! Every API response wraps its payload as
//! `{"meta": {"code": .., "errorType": .., "errorDetail": ..}, "response": {..}}`.
//! The decoder classifies the document once into an [`Envelope`] and then
//! turns that into the requested field or an error. The HTTP status code is
//! informational only; the envelope's own code decides success.

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Envelope code the service uses for success.
pub const SUCCESS_CODE: i64 = 200;

const NO_DETAIL: &str = "no error detail";

/// A classified response document.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Success code and the requested field was present.
    Data(Value),
    /// Success code but the requested field (or the whole `response`
    /// section) was absent.
    Empty,
    /// A status section with a code other than success.
    Failure {
        code: Option<i64>,
        error_type: Option<String>,
        detail: Option<String>,
    },
    /// No status section at all.
    Unrecognized(Value),
}

impl Envelope {
    /// Parse `body` and classify it with respect to `field`.
    pub fn parse(body: &str, field: &str) -> Result<Self, ApiError> {
        let document: Value = serde_json::from_str(body)?;
        Ok(Self::classify(document, field))
    }

    pub fn classify(mut document: Value, field: &str) -> Self {
        let meta = match document.get("meta") {
            None | Some(Value::Null) => return Envelope::Unrecognized(document),
            Some(meta) => meta,
        };

        let code = meta.get("code").and_then(Value::as_i64);
        if code != Some(SUCCESS_CODE) {
            let text = |key: &str| meta.get(key).and_then(Value::as_str).map(str::to_string);
            return Envelope::Failure {
                code,
                error_type: text("errorType"),
                detail: text("errorDetail"),
            };
        }

        match document
            .get_mut("response")
            .and_then(Value::as_object_mut)
            .and_then(|response| response.remove(field))
        {
            Some(value) => Envelope::Data(value),
            None => Envelope::Empty,
        }
    }

    /// Resolve to the payload value. `Empty` becomes an empty JSON object.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Envelope::Data(value) => Ok(value),
            Envelope::Empty => Ok(Value::Object(Map::new())),
            Envelope::Failure {
                code,
                error_type,
                detail,
            } => {
                let detail = detail.unwrap_or_else(|| NO_DETAIL.to_string());
                error!(
                    ?code,
                    error_type = error_type.as_deref(),
                    %detail,
                    "response had unexpected code"
                );
                Err(ApiError::NonSuccessStatus {
                    code,
                    error_type,
                    detail,
                })
            }
            Envelope::Unrecognized(document) => {
                Err(ApiError::MalformedEnvelope(document.to_string()))
            }
        }
    }
}

/// Decode `response` and extract `field` from its payload.
pub fn decode(response: &HttpResponse, field: &str) -> Result<Value, ApiError> {
    debug!(status = response.status, field, bytes = response.body.len(), "decoding response");
    Envelope::parse(&response.body, field)?.into_result()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ok(body: &str, field: &str) -> Value {
        decode(&HttpResponse::new(200, body), field).unwrap()
    }

    fn err(status: u16, body: &str, field: &str) -> ApiError {
        decode(&HttpResponse::new(status, body), field).unwrap_err()
    }

    #[test]
    fn extracts_requested_field() {
        let value = ok(
            r#"{"meta":{"code":200},"response":{"venue":{"id":"abc123"}}}"#,
            "venue",
        );
        assert_eq!(value, json!({"id": "abc123"}));
    }

    #[test]
    fn extracts_arrays() {
        let value = ok(
            r#"{"meta":{"code":200},"response":{"groups":[{"type":"nearby","items":[]}]}}"#,
            "groups",
        );
        assert_eq!(value, json!([{"type": "nearby", "items": []}]));
    }

    #[test]
    fn missing_field_yields_empty_object() {
        let value = ok(r#"{"meta":{"code":200},"response":{"other":1}}"#, "venue");
        assert_eq!(value, json!({}));
    }

    #[test]
    fn missing_response_section_yields_empty_object() {
        assert_eq!(ok(r#"{"meta":{"code":200}}"#, "tips"), json!({}));
    }

    #[test]
    fn explicit_null_field_is_returned_as_null() {
        assert_eq!(
            ok(r#"{"meta":{"code":200},"response":{"tip":null}}"#, "tip"),
            Value::Null
        );
    }

    #[test]
    fn non_success_code_carries_code_and_detail() {
        let e = err(
            400,
            r#"{"meta":{"code":400,"errorType":"param_error","errorDetail":"bad request"},
                "response":{}}"#,
            "venue",
        );
        match &e {
            ApiError::NonSuccessStatus {
                code,
                error_type,
                detail,
            } => {
                assert_eq!(*code, Some(400));
                assert_eq!(error_type.as_deref(), Some("param_error"));
                assert_eq!(detail, "bad request");
            }
            other => panic!("expected NonSuccessStatus, got {other:?}"),
        }
        assert!(e.to_string().contains("400"));
        assert!(e.to_string().contains("bad request"));
    }

    #[test]
    fn envelope_code_wins_over_http_status() {
        let e = err(200, r#"{"meta":{"code":500,"errorDetail":"boom"}}"#, "venue");
        assert_eq!(e.status_code(), Some(500));
    }

    #[test]
    fn string_code_is_not_success() {
        let e = err(200, r#"{"meta":{"code":"200"},"response":{"venue":{}}}"#, "venue");
        assert!(matches!(e, ApiError::NonSuccessStatus { code: None, .. }));
    }

    #[test]
    fn non_json_body_is_malformed_body() {
        let e = err(503, "<html><body>Service Unavailable</body></html>", "venue");
        assert!(matches!(e, ApiError::MalformedBody(_)));
    }

    #[test]
    fn empty_body_is_malformed_body() {
        assert!(matches!(err(200, "", "venue"), ApiError::MalformedBody(_)));
    }

    #[test]
    fn missing_meta_is_malformed_envelope_with_dump() {
        let e = err(200, r#"{"response":{"venue":{"id":"x"}}}"#, "venue");
        match e {
            ApiError::MalformedEnvelope(dump) => assert!(dump.contains(r#""id":"x""#)),
            other => panic!("expected MalformedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn top_level_array_is_malformed_envelope() {
        assert!(matches!(err(200, "[1,2,3]", "venue"), ApiError::MalformedEnvelope(_)));
    }

    #[test]
    fn classify_distinguishes_every_shape() {
        assert_eq!(
            Envelope::classify(json!({"meta": {"code": 200}, "response": {"tips": [1]}}), "tips"),
            Envelope::Data(json!([1]))
        );
        assert_eq!(
            Envelope::classify(json!({"meta": {"code": 200}, "response": {}}), "tips"),
            Envelope::Empty
        );
        assert_eq!(
            Envelope::classify(json!({"meta": {"code": 404}}), "tips"),
            Envelope::Failure {
                code: Some(404),
                error_type: None,
                detail: None
            }
        );
        assert_eq!(
            Envelope::classify(json!({"meta": null}), "tips"),
            Envelope::Unrecognized(json!({"meta": null}))
        );
    }
}
