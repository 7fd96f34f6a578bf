//! Application layer - exploration policy engine
//!
//! Contains the decision logic, the random policy engine and the port
//! definitions it depends on. Infrastructure adapters plug in through the
//! ports.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
