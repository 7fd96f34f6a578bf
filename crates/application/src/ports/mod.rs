//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod explore_policy;
mod history_storage;
mod param_source;
mod time_bounded_queue;

pub use explore_policy::ExplorePolicy;
#[cfg(test)]
pub use history_storage::MockHistoryStoragePort;
pub use history_storage::HistoryStoragePort;
pub use param_source::{
    ParamMap, ParamSource, ParamValue, duration_from_float_millis, duration_from_millis,
    parse_duration, split_list,
};
pub use time_bounded_queue::{QueueError, QueueItem, TimeBoundedQueue};
