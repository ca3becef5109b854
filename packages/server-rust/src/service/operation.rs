//! Operation bindings, request formats, and dispatch errors.

use dtbus_core::messages::{dict_to_json_payload, encode_payload};
use dtbus_core::{ApiError, RemoteOperation, ServiceErrorKind};
use serde_json::{Map, Value};

/// Parameter selecting the remote reply format.
pub const FORMAT_PARAM: &str = "format";

// ---------------------------------------------------------------------------
// OperationBinding
// ---------------------------------------------------------------------------

/// Binds a topic suffix to a remote operation and its required parameters.
///
/// Built once at startup and shared read-only by the dispatcher bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationBinding {
    topic_suffix: String,
    operation: RemoteOperation,
    required_params: Vec<String>,
}

impl OperationBinding {
    #[must_use]
    pub fn new<I, S>(
        topic_suffix: impl Into<String>,
        operation: RemoteOperation,
        required: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topic_suffix: topic_suffix.into(),
            operation,
            required_params: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Final topic segment, e.g. `whois`.
    #[must_use]
    pub fn topic_suffix(&self) -> &str {
        &self.topic_suffix
    }

    #[must_use]
    pub fn operation(&self) -> RemoteOperation {
        self.operation
    }

    /// Parameters that must be present in every request, in check order.
    #[must_use]
    pub fn required_params(&self) -> &[String] {
        &self.required_params
    }
}

// ---------------------------------------------------------------------------
// ResponseFormat
// ---------------------------------------------------------------------------

/// Reply formats the remote API can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Parses a `format` parameter value. Matching is exact: only the
    /// strings `"json"` and `"xml"` are accepted.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnsupportedFormat` for any other value.
    pub fn from_param(value: &Value) -> Result<Self, DispatchError> {
        match value.as_str() {
            Some("json") => Ok(Self::Json),
            Some("xml") => Ok(Self::Xml),
            Some(other) => Err(DispatchError::UnsupportedFormat {
                requested: other.to_string(),
            }),
            None => Err(DispatchError::UnsupportedFormat {
                requested: value.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ResponseBody
// ---------------------------------------------------------------------------

/// Shape of a successful reply payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The remote data was a JSON object; sent as JSON.
    Json(Map<String, Value>),
    /// Any other remote data; sent as opaque bytes.
    Opaque(Vec<u8>),
}

impl ResponseBody {
    /// Branches on the shape of the remote data.
    #[must_use]
    pub fn from_data(data: Value) -> Self {
        match data {
            Value::Object(map) => Self::Json(map),
            other => Self::Opaque(encode_payload(&other)),
        }
    }

    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        match self {
            Self::Json(map) => dict_to_json_payload(&map),
            Self::Opaque(bytes) => bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Kind name reported for failures that carry no description.
pub const UNEXPECTED_FAILURE_KIND: &str = "UnexpectedError";

/// Every way handling a single request can fail.
///
/// `Display` is the short message sent back over the bus; the `Debug`
/// representation carries the full detail and is what gets logged.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Required parameter not found: '{name}'")]
    MissingParameter { name: String },

    #[error("Unsupported format requested: '{requested}'. Only 'json' and 'xml' are supported.")]
    UnsupportedFormat { requested: String },

    /// Structured failure reported by the remote service.
    #[error("{kind}: {reason}")]
    RemoteServiceFailure {
        kind: ServiceErrorKind,
        reason: String,
    },

    /// Any other failure.
    #[error("{description}")]
    UnknownFailure {
        kind: &'static str,
        description: String,
        /// Full diagnostic chain; logged, never sent.
        detail: String,
    },
}

impl DispatchError {
    /// The message placed in the error response.
    ///
    /// Falls back to the failure kind when the description is empty.
    #[must_use]
    pub fn wire_message(&self) -> String {
        match self {
            Self::UnknownFailure {
                kind, description, ..
            } if description.is_empty() => (*kind).to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for DispatchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Service { kind, reason } => Self::RemoteServiceFailure { kind, reason },
            ApiError::Unexpected(source) => Self::UnknownFailure {
                kind: UNEXPECTED_FAILURE_KIND,
                description: source.to_string(),
                detail: format!("{source:?}"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn binding_keeps_required_order() {
        let binding =
            OperationBinding::new("reverse_ip", RemoteOperation::ReverseIp, ["domain", "limit"]);
        assert_eq!(binding.topic_suffix(), "reverse_ip");
        assert_eq!(binding.operation(), RemoteOperation::ReverseIp);
        assert_eq!(binding.required_params(), ["domain", "limit"]);
    }

    #[test]
    fn format_accepts_json_and_xml_only() {
        assert_eq!(ResponseFormat::from_param(&json!("json")).unwrap(), ResponseFormat::Json);
        assert_eq!(ResponseFormat::from_param(&json!("xml")).unwrap(), ResponseFormat::Xml);

        let err = ResponseFormat::from_param(&json!("pdf")).unwrap_err();
        assert_eq!(
            err.wire_message(),
            "Unsupported format requested: 'pdf'. Only 'json' and 'xml' are supported."
        );

        // Matching is case-sensitive.
        assert!(ResponseFormat::from_param(&json!("JSON")).is_err());
    }

    #[test]
    fn non_string_format_is_unsupported() {
        let err = ResponseFormat::from_param(&json!(5)).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnsupportedFormat { ref requested } if requested == "5"
        ));
    }

    #[test]
    fn object_data_becomes_json_body() {
        let body = ResponseBody::from_data(json!({"domain": "example.com"}));
        assert!(matches!(body, ResponseBody::Json(_)));
        assert_eq!(body.into_payload(), br#"{"domain":"example.com"}"#);
    }

    #[test]
    fn string_data_becomes_opaque_body() {
        let body = ResponseBody::from_data(json!("<xml/>"));
        assert_eq!(body, ResponseBody::Opaque(b"<xml/>".to_vec()));
    }

    #[test]
    fn missing_parameter_message_names_parameter() {
        let err = DispatchError::MissingParameter {
            name: "query".to_string(),
        };
        assert_eq!(err.wire_message(), "Required parameter not found: 'query'");
    }

    #[test]
    fn remote_failure_message_is_kind_colon_reason() {
        let err = DispatchError::from(ApiError::service(ServiceErrorKind::BadRequest, "bad query"));
        assert_eq!(err.wire_message(), "BadRequestException: bad query");
    }

    #[test]
    fn unknown_failure_uses_description() {
        let err = DispatchError::from(ApiError::from(anyhow::anyhow!("connection reset")));
        assert_eq!(err.wire_message(), "connection reset");
    }

    #[test]
    fn unknown_failure_falls_back_to_kind_name() {
        let err = DispatchError::from(ApiError::from(anyhow::anyhow!("")));
        assert_eq!(err.wire_message(), UNEXPECTED_FAILURE_KIND);
    }

    #[test]
    fn unknown_failure_detail_keeps_context_chain() {
        let source = anyhow::anyhow!("socket closed").context("fetching whois");
        let err = DispatchError::from(ApiError::from(source));
        assert_eq!(err.wire_message(), "fetching whois");
        match err {
            DispatchError::UnknownFailure { detail, .. } => {
                assert!(detail.contains("socket closed"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
