//! Tower middleware layers for the request pipeline.
//!
//! - [`metrics`]: Request timing and outcome via `tracing` spans
//! - [`pipeline`]: Composes the layers around a dispatcher

pub mod metrics;
pub mod pipeline;

pub use metrics::MetricsLayer;
pub use pipeline::build_request_pipeline;
