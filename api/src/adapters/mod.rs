//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;
pub mod telemetry;

pub use postgres::PostgresOrderRepository;
#[cfg(test)]
pub use telemetry::NoopEventSink;
pub use telemetry::TracingEventSink;
