//! Scriptable [`DomainApi`](crate::api::DomainApi) for tests and demos.
//!
//! Every operation answers through a per-operation handler, or the fallback
//! handler when none is set. The default fallback echoes the operation name
//! and the forwarded parameters back as a JSON object. Calls are recorded in
//! order so tests can assert exactly what was forwarded.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::api::{ApiError, ApiResponse, Params, RemoteOperation};

type Handler = Arc<dyn Fn(&Params) -> Result<ApiResponse, ApiError> + Send + Sync>;

/// In-memory remote API double.
pub struct StubApi {
    handlers: HashMap<RemoteOperation, Handler>,
    fallback: Option<Handler>,
    calls: Mutex<Vec<(RemoteOperation, Params)>>,
}

impl StubApi {
    /// Creates a stub that echoes every call.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers `op` with `handler`.
    #[must_use]
    pub fn on<F>(mut self, op: RemoteOperation, handler: F) -> Self
    where
        F: Fn(&Params) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    {
        self.handlers.insert(op, Arc::new(handler));
        self
    }

    /// Answers `op` with a fixed data payload.
    #[must_use]
    pub fn returning(self, op: RemoteOperation, data: Value) -> Self {
        self.on(op, move |_| Ok(ApiResponse::new(data.clone())))
    }

    /// Answers every operation without its own handler with `handler`.
    #[must_use]
    pub fn with_fallback<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Params) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<(RemoteOperation, Params)> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub(crate) fn answer(
        &self,
        op: RemoteOperation,
        params: Params,
    ) -> Result<ApiResponse, ApiError> {
        let result = match self.handlers.get(&op).or(self.fallback.as_ref()) {
            Some(handler) => handler(&params),
            None => Ok(ApiResponse::new(json!({
                "operation": op.name(),
                "params": Value::Object(params.clone()),
            }))),
        };
        self.calls.lock().push((op, params));
        result
    }
}

impl Default for StubApi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DomainApi, ServiceErrorKind};

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn echoes_by_default_and_records_calls() {
        let api = StubApi::new();
        let res = api.whois(params(json!({"query": "example.com"}))).await.unwrap();
        assert_eq!(res.data()["operation"], "whois");
        assert_eq!(res.data()["params"]["query"], "example.com");

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, RemoteOperation::Whois);
    }

    #[tokio::test]
    async fn per_operation_handler_wins_over_fallback() {
        let api = StubApi::new()
            .returning(RemoteOperation::Iris, json!({"iris": true}))
            .with_fallback(|_| Err(ApiError::service(ServiceErrorKind::NotFound, "nope")));

        let res = api.iris(Params::new()).await.unwrap();
        assert_eq!(res.data()["iris"], true);

        let err = api.reputation(Params::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "NotFoundException: nope");
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn invoke_reaches_the_named_method() {
        let api = StubApi::new();
        for op in RemoteOperation::ALL {
            let res = op.invoke(&api, Params::new()).await.unwrap();
            assert_eq!(res.data()["operation"], op.name());
        }
        let seen: Vec<_> = api.calls().into_iter().map(|(op, _)| op).collect();
        assert_eq!(seen, RemoteOperation::ALL.to_vec());
    }
}
