//! Request timing and outcome via `tracing` spans.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use dtbus_core::{Message, Request};
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps each request in a span recording topic, message
/// id, duration and outcome.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Request> for MetricsService<S>
where
    S: Service<Request, Response = Message, Error = Infallible> + Send,
    S::Future: Send + 'static,
{
    type Response = Message;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Message, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let span = info_span!(
            "request",
            topic = %request.destination_topic,
            message_id = %request.message_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(request);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                let outcome = match &result {
                    Ok(reply) if reply.is_error() => "error",
                    _ => "ok",
                };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                let span = tracing::Span::current();
                span.record("duration_ms", duration_ms);
                span.record("outcome", outcome);

                tracing::debug!(duration_ms, outcome, "request complete");

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use dtbus_core::{ErrorResponse, Response};
    use tower::ServiceExt;

    use super::*;

    /// Answers requests on `/fail` with an error and everything else with an
    /// empty response.
    #[derive(Clone)]
    struct ImmediateService;

    impl Service<Request> for ImmediateService {
        type Response = Message;
        type Error = Infallible;
        type Future = Pin<Box<dyn Future<Output = Result<Message, Infallible>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: Request) -> Self::Future {
            Box::pin(async move {
                let reply = if request.destination_topic == "/fail" {
                    Message::from(ErrorResponse::for_request(&request, "boom"))
                } else {
                    Message::from(Response::for_request(&request))
                };
                Ok(reply)
            })
        }
    }

    #[tokio::test]
    async fn passes_replies_through_unchanged() {
        let svc = MetricsLayer.layer(ImmediateService);

        let ok = Request::new("/ok");
        let reply = svc.clone().oneshot(ok.clone()).await.unwrap();
        assert!(!reply.is_error());
        assert_eq!(reply.request_message_id(), Some(ok.message_id.as_str()));

        let reply = svc.oneshot(Request::new("/fail")).await.unwrap();
        assert!(reply.is_error());
    }
}
