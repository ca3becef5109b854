//! Service application: configuration, registration, and lifecycle.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use dtbus_core::{BusError, DomainApi, MessageBus};
use tracing::info;

use crate::config::{ApiCredentials, ServiceConfig};
use crate::service::{build_registration, OperationTable};

/// The DomainTools request service.
///
/// Owns the operation table and the shared API client. Lifecycle:
/// 1. `load()` -- reads configuration and builds the API client
/// 2. `register_services()` -- registers one callback per table entry
/// 3. `run()` -- serves until the shutdown future completes, then unregisters
pub struct DomainToolsService {
    service_type: String,
    table: OperationTable,
    api: Arc<dyn DomainApi>,
}

impl DomainToolsService {
    /// Creates a service with the standard operation table.
    #[must_use]
    pub fn new(service_type: impl Into<String>, api: Arc<dyn DomainApi>) -> Self {
        Self::with_table(service_type, OperationTable::standard(), api)
    }

    #[must_use]
    pub fn with_table(
        service_type: impl Into<String>,
        table: OperationTable,
        api: Arc<dyn DomainApi>,
    ) -> Self {
        Self {
            service_type: service_type.into(),
            table,
            api,
        }
    }

    /// Loads `config_dir` and builds the API client from its credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is missing or invalid, or if
    /// `make_api` fails.
    pub fn load<F>(config_dir: impl AsRef<Path>, make_api: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&ApiCredentials) -> anyhow::Result<Arc<dyn DomainApi>>,
    {
        info!("On 'load configuration' callback.");
        let config = ServiceConfig::load(config_dir)?;
        let api = make_api(&config.credentials).with_context(|| {
            format!(
                "unable to create DomainTools API client for user '{}'",
                config.credentials.api_user
            )
        })?;
        Ok(Self::new(config.service_type, api))
    }

    #[must_use]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    #[must_use]
    pub fn table(&self) -> &OperationTable {
        &self.table
    }

    /// Registers every table entry with `bus` as a single service.
    ///
    /// # Errors
    ///
    /// Returns the bus error if registration is refused.
    pub async fn register_services(&self, bus: &dyn MessageBus) -> Result<(), BusError> {
        let registration = build_registration(&self.service_type, &self.table, &self.api);
        bus.register_service(registration).await
    }

    /// Registers the service, serves until `shutdown` completes, then
    /// unregisters.
    ///
    /// # Errors
    ///
    /// Returns an error if registering or unregistering fails.
    pub async fn run<F>(&self, bus: &dyn MessageBus, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!("On 'DXL connect' callback.");
        self.register_services(bus)
            .await
            .context("failed to register service")?;

        info!("On 'run' callback.");
        shutdown.await;

        info!(service_type = %self.service_type, "shutting down");
        bus.unregister_service(&self.service_type)
            .await
            .context("failed to unregister service")?;
        Ok(())
    }
}

/// Runs the full lifecycle: load configuration, build the API client,
/// connect, register services, and run until `shutdown` completes.
///
/// # Errors
///
/// Returns the first lifecycle phase error.
pub async fn bootstrap<F, S>(
    config_dir: impl AsRef<Path>,
    bus: &dyn MessageBus,
    make_api: F,
    shutdown: S,
) -> anyhow::Result<()>
where
    F: FnOnce(&ApiCredentials) -> anyhow::Result<Arc<dyn DomainApi>>,
    S: Future<Output = ()> + Send,
{
    let service = DomainToolsService::load(config_dir, make_api)?;
    service.run(bus, shutdown).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
