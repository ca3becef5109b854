//! `dtbus` Core: bus envelopes, payload helpers, and the bus and remote API contracts.

pub mod api;
pub mod bus;
pub mod local;
pub mod messages;
#[cfg(any(test, feature = "test-util"))]
pub mod stub;

pub use api::{
    ApiError, ApiResponse, DomainApi, Params, RemoteOperation, ServiceErrorKind, UnknownOperation,
};
pub use bus::{BusError, MessageBus, RequestCallback, ServiceRegistrationInfo};
pub use local::LocalBus;
pub use messages::{ErrorResponse, Message, MessageType, Request, Response};
#[cfg(any(test, feature = "test-util"))]
pub use stub::StubApi;
