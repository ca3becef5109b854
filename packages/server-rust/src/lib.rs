//! `dtbus` Server: exposes the DomainTools API as request/response topics on a
//! message bus.

pub mod app;
pub mod config;
pub mod service;
pub mod telemetry;

pub use app::{bootstrap, DomainToolsService};
pub use config::{
    ApiCredentials, ConfigError, ServiceConfig, CONFIG_FILE_NAME, DEFAULT_SERVICE_TYPE,
};
pub use service::{DispatchError, OperationTable, RequestDispatcher, TableError};
pub use telemetry::{init_tracing, LogFormat};
