//! Builds the bus registration for every operation in a table.

use std::sync::Arc;

use dtbus_core::{DomainApi, ServiceRegistrationInfo};
use tracing::info;

use super::callback::ServiceCallback;
use super::dispatcher::RequestDispatcher;
use super::middleware::build_request_pipeline;
use super::table::OperationTable;

/// Name the service registers under in log output.
pub const SERVICE_NAME: &str = "domaintools_service";

/// Full request topic for a suffix under `service_type`.
#[must_use]
pub fn topic_for(service_type: &str, suffix: &str) -> String {
    format!("{}/{suffix}", service_type.trim_end_matches('/'))
}

/// Creates one dispatcher per table entry, each wrapped in the request
/// middleware, and collects them into a single service registration.
///
/// Topics are added in table order.
#[must_use]
pub fn build_registration(
    service_type: &str,
    table: &OperationTable,
    api: &Arc<dyn DomainApi>,
) -> ServiceRegistrationInfo {
    info!("Registering service: {SERVICE_NAME}");
    let mut registration = ServiceRegistrationInfo::new(service_type);

    for binding in table.iter() {
        info!(
            "Registering request callback: domaintools_{}_requesthandler",
            binding.topic_suffix()
        );
        let dispatcher = RequestDispatcher::new(Arc::clone(binding), Arc::clone(api));
        let callback = ServiceCallback::new(build_request_pipeline(dispatcher));
        registration.add_topic(
            topic_for(service_type, binding.topic_suffix()),
            Arc::new(callback),
        );
    }

    registration
}

#[cfg(test)]
mod tests {
    use dtbus_core::StubApi;

    use super::*;

    #[test]
    fn topic_joins_prefix_and_suffix() {
        assert_eq!(topic_for("/a/b", "whois"), "/a/b/whois");
        assert_eq!(topic_for("/a/b/", "whois"), "/a/b/whois");
    }

    #[test]
    fn registration_has_one_topic_per_binding_in_order() {
        let table = OperationTable::standard();
        let api: Arc<dyn DomainApi> = Arc::new(StubApi::new());
        let info = build_registration("/svc", &table, &api);

        assert_eq!(info.service_type(), "/svc");
        let topics: Vec<_> = info.topics().collect();
        assert_eq!(topics.len(), table.len());
        assert_eq!(topics[0], "/svc/account_information");
        assert_eq!(topics[topics.len() - 1], "/svc/whois_history");
    }
}
