//! Pipeline composition: wraps a dispatcher in the middleware stack.

use tower::ServiceBuilder;

use super::metrics::{MetricsLayer, MetricsService};
use crate::service::dispatcher::RequestDispatcher;

/// Wraps `dispatcher` with the request middleware.
///
/// The returned service implements `tower::Service<Request>` and is cheap to
/// clone.
#[must_use]
pub fn build_request_pipeline(dispatcher: RequestDispatcher) -> MetricsService<RequestDispatcher> {
    ServiceBuilder::new().layer(MetricsLayer).service(dispatcher)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dtbus_core::{RemoteOperation, Request, StubApi};
    use tower::ServiceExt;

    use super::*;
    use crate::service::operation::OperationBinding;

    #[tokio::test]
    async fn pipeline_routes_through_dispatcher() {
        let api = Arc::new(StubApi::new());
        let binding = OperationBinding::new("iris", RemoteOperation::Iris, Vec::<String>::new());
        let svc = build_request_pipeline(RequestDispatcher::new(Arc::new(binding), api.clone()));

        let reply = svc.oneshot(Request::new("/t/iris")).await.unwrap();
        assert!(!reply.is_error());
        assert_eq!(api.calls()[0].0, RemoteOperation::Iris);
    }
}
