//! Time-bounded queue adapters

mod basic;

pub use basic::BasicTimeBoundedQueue;
