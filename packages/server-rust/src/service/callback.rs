//! Adapts a tower request pipeline to the bus callback contract.

use std::convert::Infallible;

use async_trait::async_trait;
use dtbus_core::{Message, Request, RequestCallback};
use tower::{Service, ServiceExt};

/// Bus callback that drives each request through a cloned pipeline.
#[derive(Debug, Clone)]
pub struct ServiceCallback<S> {
    service: S,
}

impl<S> ServiceCallback<S> {
    #[must_use]
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> RequestCallback for ServiceCallback<S>
where
    S: Service<Request, Response = Message, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send,
{
    async fn on_request(&self, request: &Request) -> Message {
        match self.service.clone().oneshot(request.clone()).await {
            Ok(reply) => reply,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dtbus_core::{RemoteOperation, StubApi};

    use super::*;
    use crate::service::dispatcher::RequestDispatcher;
    use crate::service::middleware::build_request_pipeline;
    use crate::service::operation::OperationBinding;

    #[tokio::test]
    async fn callback_replies_through_pipeline() {
        let binding = OperationBinding::new("whois", RemoteOperation::Whois, ["query"]);
        let dispatcher = RequestDispatcher::new(Arc::new(binding), Arc::new(StubApi::new()));
        let callback = ServiceCallback::new(build_request_pipeline(dispatcher));

        let reply = callback.on_request(&Request::new("/t/whois")).await;
        let Message::Error(err) = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(err.error_message, "Required parameter not found: 'query'");
    }
}
