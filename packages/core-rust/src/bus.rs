//! Message bus contracts.
//!
//! The production fabric (connection management, subscription, correlation,
//! transport security) lives outside this workspace. Services only see the
//! two traits below: a [`RequestCallback`] answers requests on a topic, and a
//! [`MessageBus`] hosts registered services and carries synchronous requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::messages::{Message, Request};

// ---------------------------------------------------------------------------
// RequestCallback
// ---------------------------------------------------------------------------

/// Handler for requests arriving on a single topic.
///
/// The callback produces exactly one reply per request; the bus delivers it
/// to the requester. Implementations must not panic on bad input: every
/// failure becomes a [`Message::Error`].
#[async_trait]
pub trait RequestCallback: Send + Sync {
    async fn on_request(&self, request: &Request) -> Message;
}

// ---------------------------------------------------------------------------
// ServiceRegistrationInfo
// ---------------------------------------------------------------------------

/// A service instance: its type plus the topics it answers on.
#[derive(Clone)]
pub struct ServiceRegistrationInfo {
    service_type: String,
    callbacks: Vec<(String, Arc<dyn RequestCallback>)>,
}

impl ServiceRegistrationInfo {
    #[must_use]
    pub fn new(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            callbacks: Vec::new(),
        }
    }

    /// Adds a request callback for `topic`. Registration order is preserved.
    pub fn add_topic(&mut self, topic: impl Into<String>, callback: Arc<dyn RequestCallback>) {
        self.callbacks.push((topic.into(), callback));
    }

    #[must_use]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Topics in registration order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.callbacks.iter().map(|(topic, _)| topic.as_str())
    }

    /// Topic/callback pairs in registration order.
    #[must_use]
    pub fn callbacks(&self) -> &[(String, Arc<dyn RequestCallback>)] {
        &self.callbacks
    }
}

impl std::fmt::Debug for ServiceRegistrationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistrationInfo")
            .field("service_type", &self.service_type)
            .field("topics", &self.topics().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// MessageBus
// ---------------------------------------------------------------------------

/// Errors surfaced by a bus implementation.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("service already registered: {service_type}")]
    DuplicateService { service_type: String },
    #[error("topic already served by {service_type}: {topic}")]
    TopicInUse { topic: String, service_type: String },
    #[error("service not registered: {service_type}")]
    UnknownService { service_type: String },
    #[error("request to {topic} timed out after {timeout_ms}ms")]
    Timeout { topic: String, timeout_ms: u64 },
    #[error("bus is disconnected")]
    Disconnected,
}

/// Publish/subscribe request-response fabric.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Registers a service and starts routing its topics to its callbacks.
    async fn register_service(&self, info: ServiceRegistrationInfo) -> Result<(), BusError>;

    /// Stops routing the topics of a previously registered service.
    async fn unregister_service(&self, service_type: &str) -> Result<(), BusError>;

    /// Sends a request and waits for its reply.
    async fn sync_request(&self, request: Request, timeout: Duration) -> Result<Message, BusError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Response;

    struct Echo;

    #[async_trait]
    impl RequestCallback for Echo {
        async fn on_request(&self, request: &Request) -> Message {
            let mut res = Response::for_request(request);
            res.payload.clone_from(&request.payload);
            Message::Response(res)
        }
    }

    #[test]
    fn registration_preserves_topic_order() {
        let mut info = ServiceRegistrationInfo::new("/svc");
        info.add_topic("/svc/b", Arc::new(Echo));
        info.add_topic("/svc/a", Arc::new(Echo));
        assert_eq!(info.service_type(), "/svc");
        assert_eq!(info.topics().collect::<Vec<_>>(), vec!["/svc/b", "/svc/a"]);
        assert_eq!(info.callbacks().len(), 2);
    }

    #[test]
    fn debug_lists_topics() {
        let mut info = ServiceRegistrationInfo::new("/svc");
        info.add_topic("/svc/whois", Arc::new(Echo));
        let out = format!("{info:?}");
        assert!(out.contains("/svc/whois"));
    }
}
