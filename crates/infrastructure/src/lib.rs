//! Infrastructure layer - Adapters for the application ports
//!
//! Provides the in-memory time-bounded queue, configuration sources built on
//! the `config` crate and logging setup.

pub mod config;
pub mod queue;
pub mod telemetry;

pub use config::ConfigParamSource;
pub use queue::BasicTimeBoundedQueue;
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_tracing};
