//! Wire envelopes exchanged over the message bus.
//!
//! A client publishes a [`Request`] to a service topic and receives either a
//! [`Response`] or an [`ErrorResponse`] correlated by `request_message_id`.
//! All envelopes serialize as JSON with camelCase field names and a `type`
//! discriminant so they can cross any transport that moves bytes.

pub mod payload;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use payload::{
    decode_payload, dict_to_json_payload, encode_payload, json_payload_to_map, to_pretty_json,
    PayloadError,
};

/// Generates a fresh message identifier (UUID v4, braces included to match
/// the identifier format used by DXL brokers).
#[must_use]
pub fn new_message_id() -> String {
    format!("{{{}}}", Uuid::new_v4())
}

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// Discriminant for the envelope variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
    Error,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A request published to a service topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique identifier of this request.
    pub message_id: String,
    /// Topic the request is addressed to (e.g. `/svc/type/whois`).
    pub destination_topic: String,
    /// Topic the requester listens on for the reply, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reply_to_topic: Option<String>,
    /// Raw payload bytes. Empty when the requester sent no payload.
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl Request {
    /// Creates a request with an empty payload and a fresh message id.
    #[must_use]
    pub fn new(destination_topic: impl Into<String>) -> Self {
        Self {
            message_id: new_message_id(),
            destination_topic: destination_topic.into(),
            reply_to_topic: None,
            payload: Vec::new(),
        }
    }

    /// Returns `true` when the request carries a non-empty payload.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Response / ErrorResponse
// ---------------------------------------------------------------------------

/// Successful reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub message_id: String,
    /// Identifier of the request this response answers.
    pub request_message_id: String,
    /// Reply topic copied from the request.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub destination_topic: Option<String>,
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl Response {
    /// Creates an empty response bound to `request`.
    #[must_use]
    pub fn for_request(request: &Request) -> Self {
        Self {
            message_id: new_message_id(),
            request_message_id: request.message_id.clone(),
            destination_topic: request.reply_to_topic.clone(),
            payload: Vec::new(),
        }
    }
}

/// Failed reply to a [`Request`]. Carries a short human-readable message only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message_id: String,
    pub request_message_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub destination_topic: Option<String>,
    /// Numeric error code. Service-generated errors use 0.
    #[serde(default)]
    pub error_code: i32,
    pub error_message: String,
}

impl ErrorResponse {
    /// Creates an error response bound to `request` with error code 0.
    #[must_use]
    pub fn for_request(request: &Request, error_message: impl Into<String>) -> Self {
        Self::with_code(request, 0, error_message)
    }

    /// Creates an error response bound to `request` with an explicit code.
    #[must_use]
    pub fn with_code(request: &Request, error_code: i32, error_message: impl Into<String>) -> Self {
        Self {
            message_id: new_message_id(),
            request_message_id: request.message_id.clone(),
            destination_topic: request.reply_to_topic.clone(),
            error_code,
            error_message: error_message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Any envelope that can travel over the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Request(Request),
    Response(Response),
    Error(ErrorResponse),
}

impl Message {
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Request(_) => MessageType::Request,
            Self::Response(_) => MessageType::Response,
            Self::Error(_) => MessageType::Error,
        }
    }

    /// Identifier of the request this message answers, if it is a reply.
    #[must_use]
    pub fn request_message_id(&self) -> Option<&str> {
        match self {
            Self::Request(_) => None,
            Self::Response(r) => Some(&r.request_message_id),
            Self::Error(e) => Some(&e.request_message_id),
        }
    }

    /// Returns `true` for [`Message::Error`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<Response> for Message {
    fn from(value: Response) -> Self {
        Self::Response(value)
    }
}

impl From<ErrorResponse> for Message {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
