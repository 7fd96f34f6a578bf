//! Logging initialisation
//!
//! Installs a `tracing` subscriber with an `EnvFilter` and either a human
//! readable or a JSON formatter. Logs go to stderr; stdout is left to the
//! action stream.

mod subscriber;

pub use subscriber::{LogFormat, TelemetryConfig, TelemetryError, init_tracing};
