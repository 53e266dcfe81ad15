#![forbid(unsafe_code)]
//! Wire contract for the formbridge service. The transport layer decodes
//! incoming payloads into records through this crate and maps core errors
//! onto the one error envelope every endpoint shares.

use formbridge_model::Record;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CRATE_NAME: &str = "formbridge-api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidPayload,
    EmptyPayload,
    MissingQueryParameter,
    FormatError,
    NotFound,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPayload => "invalid_payload",
            Self::EmptyPayload => "empty_payload",
            Self::MissingQueryParameter => "missing_query_parameter",
            Self::FormatError => "format_error",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }

    /// HTTP status the transport layer serves this code with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidPayload
            | Self::EmptyPayload
            | Self::MissingQueryParameter
            | Self::FormatError => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn invalid_payload(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidPayload,
            "request body is not a record or record list",
            json!({"reason": reason}),
        )
    }

    #[must_use]
    pub fn missing_query_param(name: &str) -> Self {
        Self::new(
            ApiErrorCode::MissingQueryParameter,
            format!("missing query parameter: {name}"),
            json!({"parameter": name}),
        )
    }
}

/// Decodes an upsert body. A JSON object is a single-record upsert (merge
/// semantics downstream); a JSON array is a batch (destructive replace when
/// it holds more than one record). Anything else, and any element that is
/// not an object keyed by `Field`, is an invalid payload.
pub fn decode_upsert_payload(body: &[u8]) -> Result<Vec<Record>, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_payload(&e.to_string()))?;

    match value {
        Value::Object(_) => {
            let record = decode_record(value)?;
            Ok(vec![record])
        }
        Value::Array(items) => items.into_iter().map(decode_record).collect(),
        _ => Err(ApiError::invalid_payload(
            "expected a JSON object or array of objects",
        )),
    }
}

fn decode_record(value: Value) -> Result<Record, ApiError> {
    if !value.is_object() {
        return Err(ApiError::invalid_payload("array element is not an object"));
    }
    serde_json::from_value(value).map_err(|e| ApiError::invalid_payload(&e.to_string()))
}

/// Static OpenAPI v1 document served at `/openapi.json`.
#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "formbridge API",
        "version": "v1"
      },
      "paths": {
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/v1/version": {"get": {"responses": {"200": {"description": "crate version"}}}},
        "/v1/records": {
          "get": {
            "parameters": [
              {"name": "path", "in": "query", "required": true, "schema": {"type": "string"}}
            ],
            "responses": {
              "200": {"description": "ordered record list, shape per header"},
              "400": {"description": "bad header or missing parameter", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "404": {"description": "store file missing", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          },
          "post": {
            "parameters": [
              {"name": "path", "in": "query", "required": true, "schema": {"type": "string"}}
            ],
            "requestBody": {"description": "one record object, or an array of record objects"},
            "responses": {
              "200": {"description": "upsert outcome"},
              "400": {"description": "invalid or empty payload", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "404": {"description": "store file missing", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/v1/fill": {
          "post": {
            "responses": {
              "200": {"description": "fill report with artifact checksum"},
              "404": {"description": "records or template missing"}
            }
          }
        },
        "/v1/document/base64": {
          "get": {
            "responses": {
              "200": {"description": "base64 of the filled artifact"},
              "404": {"description": "no fill has run yet"}
            }
          }
        },
        "/v1/fields": {
          "get": {
            "responses": {
              "200": {"description": "ordered template field names, empty names included"}
            }
          }
        },
        "/v1/fields/normalize": {
          "post": {
            "responses": {
              "200": {"description": "normalize report; renamed copy written alongside the artifact"},
              "404": {"description": "no filled artifact to normalize"}
            }
          }
        }
      },
      "components": {
        "schemas": {
          "ApiErrorCode": {
            "type": "string",
            "enum": [
              "InvalidPayload",
              "EmptyPayload",
              "MissingQueryParameter",
              "FormatError",
              "NotFound",
              "Internal"
            ]
          },
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details"],
            "additionalProperties": false,
            "properties": {
              "code": {"$ref": "#/components/schemas/ApiErrorCode"},
              "message": {"type": "string"},
              "details": {"type": "object"}
            }
          }
        }
      }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formbridge_model::RecordShape;

    #[test]
    fn object_body_decodes_to_a_single_record() {
        let records =
            decode_upsert_payload(br#"{"Field":"age","Value":"31"}"#).expect("decode");
        assert_eq!(records, vec![Record::key_value("age", "31")]);
    }

    #[test]
    fn array_body_decodes_to_a_batch_in_order() {
        let records = decode_upsert_payload(
            br#"[{"Field":"x","Value":"1"},{"Field":"y","Value":"2"}]"#,
        )
        .expect("decode");
        assert_eq!(
            records,
            vec![Record::key_value("x", "1"), Record::key_value("y", "2")]
        );
    }

    #[test]
    fn metadata_object_decodes_to_the_metadata_shape() {
        let records = decode_upsert_payload(
            br#"{"Field":"name","Section":"intake","Notes":"","PdfPage":"1","DataType":"text"}"#,
        )
        .expect("decode");
        assert_eq!(records[0].shape(), RecordShape::Metadata);
    }

    #[test]
    fn scalar_and_mixed_bodies_are_invalid() {
        assert_eq!(
            decode_upsert_payload(b"42").expect_err("scalar").code,
            ApiErrorCode::InvalidPayload
        );
        assert_eq!(
            decode_upsert_payload(br#"[{"Field":"x","Value":"1"}, 7]"#)
                .expect_err("mixed array")
                .code,
            ApiErrorCode::InvalidPayload
        );
        assert_eq!(
            decode_upsert_payload(br#"{"NotField":"x"}"#)
                .expect_err("object without key")
                .code,
            ApiErrorCode::InvalidPayload
        );
    }

    #[test]
    fn empty_array_decodes_to_an_empty_batch() {
        // The store, not the wire layer, rejects this; decoding succeeds.
        let records = decode_upsert_payload(b"[]").expect("decode");
        assert!(records.is_empty());
    }

    #[test]
    fn error_codes_map_to_expected_statuses() {
        assert_eq!(ApiErrorCode::InvalidPayload.http_status(), 400);
        assert_eq!(ApiErrorCode::NotFound.http_status(), 404);
        assert_eq!(ApiErrorCode::Internal.http_status(), 500);
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let spec = openapi_v1_spec();
        let paths = spec["paths"].as_object().expect("paths object");
        for route in [
            "/healthz",
            "/v1/version",
            "/v1/records",
            "/v1/fill",
            "/v1/document/base64",
            "/v1/fields",
            "/v1/fields/normalize",
        ] {
            assert!(paths.contains_key(route), "missing route {route}");
        }
    }
}
