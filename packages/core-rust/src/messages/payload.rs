//! Payload encoding helpers.
//!
//! Payloads travel as raw bytes. Services that speak JSON decode them into a
//! `serde_json::Map` and encode their replies back into UTF-8 JSON text.

use serde_json::{Map, Value};

/// Errors raised while converting between payload bytes and JSON.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("payload is JSON but not an object (found {found})")]
    NotAnObject { found: &'static str },
}

/// Decodes a payload as UTF-8 text, replacing invalid sequences.
#[must_use]
pub fn decode_payload(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}

/// Parses a payload as a JSON object.
///
/// # Errors
///
/// Returns `PayloadError::InvalidJson` if the bytes are not JSON, and
/// `PayloadError::NotAnObject` if they are JSON of another shape.
pub fn json_payload_to_map(payload: &[u8]) -> Result<Map<String, Value>, PayloadError> {
    match serde_json::from_slice::<Value>(payload)? {
        Value::Object(map) => Ok(map),
        other => Err(PayloadError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

/// Encodes a JSON object as compact payload bytes.
#[must_use]
pub fn dict_to_json_payload(map: &Map<String, Value>) -> Vec<u8> {
    // Serializing a Map<String, Value> cannot fail: keys are strings.
    serde_json::to_vec(map).unwrap_or_default()
}

/// Encodes an opaque value as payload bytes.
///
/// Strings are sent as their raw UTF-8 text (e.g. an XML document); every
/// other value is sent as its compact JSON text.
#[must_use]
pub fn encode_payload(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        other => serde_json::to_vec(other).unwrap_or_default(),
    }
}

/// Pretty-prints a JSON value with 4-space indentation and sorted keys.
#[must_use]
pub fn to_pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // serde_json::Map is a BTreeMap without the `preserve_order` feature,
    // so object keys come out sorted.
    if serde::Serialize::serialize(value, &mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn object_payload_parses() {
        let map = json_payload_to_map(br#"{"query": "example.com"}"#).unwrap();
        assert_eq!(map["query"], "example.com");
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let err = json_payload_to_map(b"{not json").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidJson(_)));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = json_payload_to_map(b"[1, 2]").unwrap_err();
        assert!(matches!(err, PayloadError::NotAnObject { found: "array" }));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn string_values_encode_as_raw_text() {
        let xml = "<whoisrecord><domain>example.com</domain></whoisrecord>";
        assert_eq!(encode_payload(&json!(xml)), xml.as_bytes());
    }

    #[test]
    fn non_string_values_encode_as_json_text() {
        assert_eq!(encode_payload(&json!([1, 2])), b"[1,2]");
    }

    #[test]
    fn dict_payload_round_trips() {
        let value = json!({"domain": "example.com", "count": 3});
        let map = value.as_object().unwrap();
        let bytes = dict_to_json_payload(map);
        assert_eq!(&json_payload_to_map(&bytes).unwrap(), map);
    }

    #[test]
    fn decode_payload_is_lossy() {
        assert_eq!(decode_payload(b"abc"), "abc");
        assert_eq!(decode_payload(&[0x61, 0xff]), "a\u{fffd}");
    }

    #[test]
    fn pretty_json_uses_four_space_indent() {
        let out = to_pretty_json(&json!({"b": 1, "a": 2}));
        assert_eq!(out, "{\n    \"a\": 2,\n    \"b\": 1\n}");
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(
            bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..256),
        ) {
            let text = decode_payload(&bytes);
            proptest::prop_assert!(text.len() >= bytes.len());
            let _ = json_payload_to_map(&bytes);
        }
    }
}
