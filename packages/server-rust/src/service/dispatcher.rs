//! Per-topic request dispatch.
//!
//! A [`RequestDispatcher`] is bound to one [`OperationBinding`] when the
//! service registers. For each request it decodes the JSON payload, checks
//! the required parameters, defaults and validates `format`, invokes the
//! bound remote operation with the full parameter map, and shapes the reply.
//! It never fails: every outcome becomes a `Response` or an `ErrorResponse`.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use dtbus_core::messages::{decode_payload, json_payload_to_map};
use dtbus_core::{DomainApi, ErrorResponse, Message, Params, Request, Response};
use serde_json::Value;
use tower::Service;
use tracing::{error, info, warn};

use super::operation::{DispatchError, OperationBinding, ResponseBody, ResponseFormat, FORMAT_PARAM};

/// Handles requests for a single topic.
#[derive(Clone)]
pub struct RequestDispatcher {
    binding: Arc<OperationBinding>,
    api: Arc<dyn DomainApi>,
}

impl RequestDispatcher {
    #[must_use]
    pub fn new(binding: Arc<OperationBinding>, api: Arc<dyn DomainApi>) -> Self {
        Self { binding, api }
    }

    #[must_use]
    pub fn binding(&self) -> &OperationBinding {
        &self.binding
    }

    /// Handles one request and builds the reply envelope.
    pub async fn handle(&self, request: &Request) -> Message {
        info!(
            "Request received on topic: '{}' with payload: '{}'",
            request.destination_topic,
            decode_payload(&request.payload)
        );

        match self.dispatch(&request.payload).await {
            Ok(body) => {
                let mut response = Response::for_request(request);
                response.payload = body.into_payload();
                Message::Response(response)
            }
            Err(err) => {
                error!(
                    topic = %request.destination_topic,
                    error = ?err,
                    "Error handling request"
                );
                Message::Error(ErrorResponse::for_request(request, err.wire_message()))
            }
        }
    }

    /// Runs the dispatch steps on a raw payload.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` for a missing required parameter, an
    /// unsupported `format`, or a failed remote call.
    pub async fn dispatch(&self, payload: &[u8]) -> Result<ResponseBody, DispatchError> {
        let mut params = self.decode_params(payload);

        if let Some(name) = self
            .binding
            .required_params()
            .iter()
            .find(|name| !params.contains_key(name.as_str()))
        {
            return Err(DispatchError::MissingParameter { name: name.clone() });
        }

        match params.get(FORMAT_PARAM) {
            Some(value) => {
                ResponseFormat::from_param(value)?;
            }
            None => {
                params.insert(
                    FORMAT_PARAM.to_string(),
                    Value::from(ResponseFormat::default().as_str()),
                );
            }
        }

        let response = self
            .binding
            .operation()
            .invoke(self.api.as_ref(), params)
            .await?;
        Ok(ResponseBody::from_data(response.into_data()))
    }

    fn decode_params(&self, payload: &[u8]) -> Params {
        if payload.is_empty() {
            return Params::new();
        }
        match json_payload_to_map(payload) {
            Ok(map) => map,
            Err(err) => {
                warn!(
                    operation = %self.binding.operation(),
                    error = %err,
                    "ignoring undecodable request payload"
                );
                Params::new()
            }
        }
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

impl Service<Request> for RequestDispatcher {
    type Response = Message;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Message, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.handle(&request).await) })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
