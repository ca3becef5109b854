//! In-process message bus.
//!
//! `LocalBus` routes requests to registered callbacks by exact destination
//! topic without any network hop. It backs the integration tests and the
//! sample client, and mirrors the broker semantics services rely on: one
//! service per topic, an error reply for topics nobody serves, and a
//! caller-side timeout on synchronous requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::bus::{BusError, MessageBus, RequestCallback, ServiceRegistrationInfo};
use crate::messages::{ErrorResponse, Message, Request};

/// Error code returned when no registered service answers a topic.
#[allow(clippy::cast_possible_wrap)]
pub const SERVICE_UNAVAILABLE_CODE: i32 = 0x8000_0001_u32 as i32;

/// Error message returned when no registered service answers a topic.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "unable to locate service for request";

/// A topic's owning service and its callback.
struct TopicEntry {
    service_type: String,
    callback: Arc<dyn RequestCallback>,
}

/// In-memory request/response broker.
pub struct LocalBus {
    topics: DashMap<String, TopicEntry>,
    /// Service type -> topics it registered, for unregistration.
    services: DashMap<String, Vec<String>>,
    connected: AtomicBool,
}

impl LocalBus {
    /// Creates a connected bus with no services.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
            services: DashMap::new(),
            connected: AtomicBool::new(true),
        }
    }

    /// Number of topics currently routed.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Returns `true` if a service answers `topic`.
    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::Release);
    }

    /// Disconnects the bus. Further requests fail with `BusError::Disconnected`.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    fn ensure_connected(&self) -> Result<(), BusError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(BusError::Disconnected)
        }
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for LocalBus {
    async fn register_service(&self, info: ServiceRegistrationInfo) -> Result<(), BusError> {
        self.ensure_connected()?;
        let service_type = info.service_type().to_string();

        // The vacant slot stays locked until the service is recorded, so a
        // concurrent registration of the same type sees it as taken.
        let Entry::Vacant(slot) = self.services.entry(service_type.clone()) else {
            return Err(BusError::DuplicateService { service_type });
        };

        let mut topics: Vec<String> = Vec::with_capacity(info.callbacks().len());
        for (topic, callback) in info.callbacks() {
            match self.topics.entry(topic.clone()) {
                Entry::Occupied(existing) => {
                    let owner = existing.get().service_type.clone();
                    drop(existing);
                    for added in &topics {
                        self.topics.remove(added);
                    }
                    return Err(BusError::TopicInUse {
                        topic: topic.clone(),
                        service_type: owner,
                    });
                }
                Entry::Vacant(free) => {
                    free.insert(TopicEntry {
                        service_type: service_type.clone(),
                        callback: Arc::clone(callback),
                    });
                    topics.push(topic.clone());
                }
            }
        }

        info!(
            service_type = %service_type,
            topics = topics.len(),
            "service registered"
        );
        slot.insert(topics);
        Ok(())
    }

    async fn unregister_service(&self, service_type: &str) -> Result<(), BusError> {
        let (_, topics) =
            self.services
                .remove(service_type)
                .ok_or_else(|| BusError::UnknownService {
                    service_type: service_type.to_string(),
                })?;
        for topic in &topics {
            self.topics.remove(topic);
        }
        info!(service_type = %service_type, "service unregistered");
        Ok(())
    }

    async fn sync_request(&self, request: Request, timeout: Duration) -> Result<Message, BusError> {
        self.ensure_connected()?;

        // Clone the callback out so no map guard is held across the await.
        let callback = self
            .topics
            .get(&request.destination_topic)
            .map(|entry| Arc::clone(&entry.callback));

        let Some(callback) = callback else {
            debug!(topic = %request.destination_topic, "no service for topic");
            return Ok(Message::Error(ErrorResponse::with_code(
                &request,
                SERVICE_UNAVAILABLE_CODE,
                SERVICE_UNAVAILABLE_MESSAGE,
            )));
        };

        match tokio::time::timeout(timeout, callback.on_request(&request)).await {
            Ok(reply) => Ok(reply),
            Err(_elapsed) => Err(BusError::Timeout {
                topic: request.destination_topic,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
