//! Explore policy registry

use std::sync::Arc;

use domain::Event;

use super::random_policy::{POLICY_NAME as RANDOM, RandomPolicy};
use crate::error::ApplicationError;
use crate::ports::{ExplorePolicy, TimeBoundedQueue};

/// Names accepted by [`create_policy`]
pub const AVAILABLE_POLICIES: &[&str] = &[RANDOM];

/// Create the policy registered under `name`
pub fn create_policy(
    name: &str,
    queue: Arc<dyn TimeBoundedQueue<Event>>,
) -> Result<Arc<dyn ExplorePolicy>, ApplicationError> {
    match name {
        RANDOM => Ok(Arc::new(RandomPolicy::new(queue)?)),
        other => Err(ApplicationError::UnknownPolicy(other.to_string())),
    }
}
