//! Domain layer for aftershock
//!
//! Contains the events observed from the system under test, the actions an
//! exploration policy answers them with, executed traces, and domain errors.
//! This layer has no runtime dependencies and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
