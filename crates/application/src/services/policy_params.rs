//! Random policy parameters
//!
//! Parameters live in an immutable snapshot. A reload builds a complete
//! candidate from the current snapshot plus the keys present in the source,
//! validates it as a whole, and only then replaces the old one.

use std::collections::BTreeSet;
use std::time::Duration;

use domain::EntityId;
use serde::Serialize;
use tracing::debug;

use crate::error::ApplicationError;
use crate::ports::ParamSource;

/// Configuration keys understood by the random policy
pub mod keys {
    /// Name of the policy the configuration is meant for
    pub const EXPLORE_POLICY: &str = "explorePolicy";
    /// Prefix shared by all policy parameters
    pub const PARAM_PREFIX: &str = "explorepolicyparam.";
    pub const MIN_INTERVAL: &str = "explorepolicyparam.minInterval";
    pub const MAX_INTERVAL: &str = "explorepolicyparam.maxInterval";
    pub const PRIORITIZED_ENTITIES: &str = "explorepolicyparam.prioritizedEntities";
    pub const SHELL_ACTION_INTERVAL: &str = "explorepolicyparam.shellActionInterval";
    pub const SHELL_ACTION_COMMAND: &str = "explorepolicyparam.shellActionCommand";
    pub const FAULT_ACTION_PROBABILITY: &str = "explorepolicyparam.faultActionProbability";
    pub const PROC_RESET_SCHED_PROBABILITY: &str =
        "explorepolicyparam.procResetSchedProbability";
}

/// Default probability of resetting a process-scheduling request
pub const DEFAULT_PROC_RESET_SCHED_PROBABILITY: f64 = 0.1;

// Prioritized entities get their window scaled by 0.8 (= 4/5).
const PRIORITY_SCALE_NUM: u128 = 4;
const PRIORITY_SCALE_DEN: u128 = 5;

/// Scale a delay by the priority coefficient 0.8, truncating to nanoseconds
pub fn scale_for_priority(delay: Duration) -> Duration {
    let nanos = delay.as_nanos() * PRIORITY_SCALE_NUM / PRIORITY_SCALE_DEN;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// A consistent set of random policy parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyParams {
    /// Lower bound of the delay before an event is decided on
    pub min_interval: Duration,
    /// Upper bound of that delay; not required to be >= `min_interval`
    pub max_interval: Duration,
    /// Entities whose events get a shorter delay window
    pub prioritized_entities: BTreeSet<EntityId>,
    /// Period of the shell action loop; zero disables it
    pub shell_action_interval: Duration,
    /// Command carried by shell actions
    pub shell_action_command: String,
    /// Probability of answering an event with its fault action
    pub fault_action_probability: f64,
    /// Probability of resetting a process-scheduling request
    pub proc_reset_sched_probability: f64,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            min_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            prioritized_entities: BTreeSet::new(),
            shell_action_interval: Duration::ZERO,
            shell_action_command: String::new(),
            fault_action_probability: 0.0,
            proc_reset_sched_probability: DEFAULT_PROC_RESET_SCHED_PROBABILITY,
        }
    }
}

impl PolicyParams {
    /// Whether events from this entity are prioritized
    pub fn is_prioritized(&self, entity: &EntityId) -> bool {
        self.prioritized_entities.contains(entity)
    }

    /// Effective delay window for an event from `entity`
    pub fn intervals_for(&self, entity: &EntityId) -> (Duration, Duration) {
        if self.is_prioritized(entity) {
            (
                scale_for_priority(self.min_interval),
                scale_for_priority(self.max_interval),
            )
        } else {
            (self.min_interval, self.max_interval)
        }
    }

    /// Whether the shell action loop should be running
    pub fn shell_enabled(&self) -> bool {
        !self.shell_action_interval.is_zero()
    }

    /// Check the constraints that typed fields cannot express
    pub fn validate(&self) -> Result<(), ApplicationError> {
        check_probability(keys::FAULT_ACTION_PROBABILITY, self.fault_action_probability)?;
        check_probability(
            keys::PROC_RESET_SCHED_PROBABILITY,
            self.proc_reset_sched_probability,
        )?;
        Ok(())
    }

    /// Build the successor of this snapshot from the keys present in `source`
    ///
    /// Absent keys keep their current value, except `maxInterval`, which
    /// falls back to the (possibly just updated) `minInterval`. Prioritized
    /// entities are merged into the existing set. Nothing is applied when
    /// any value is invalid.
    pub fn apply(&self, source: &dyn ParamSource) -> Result<Self, ApplicationError> {
        let mut next = self.clone();

        if source.is_set(keys::MIN_INTERVAL) {
            next.min_interval = source.get_duration(keys::MIN_INTERVAL)?;
            debug!(min_interval = ?next.min_interval, "Read minInterval");
        }

        if source.is_set(keys::MAX_INTERVAL) {
            next.max_interval = source.get_duration(keys::MAX_INTERVAL)?;
            debug!(max_interval = ?next.max_interval, "Read maxInterval");
        } else {
            next.max_interval = next.min_interval;
        }

        if source.is_set(keys::PRIORITIZED_ENTITIES) {
            for raw in source.get_string_list(keys::PRIORITIZED_ENTITIES)? {
                let entity = EntityId::new(raw).map_err(|e| {
                    ApplicationError::invalid_parameter(keys::PRIORITIZED_ENTITIES, e.to_string())
                })?;
                next.prioritized_entities.insert(entity);
            }
            debug!(count = next.prioritized_entities.len(), "Read prioritizedEntities");
        }

        if source.is_set(keys::SHELL_ACTION_INTERVAL) {
            next.shell_action_interval = source.get_duration(keys::SHELL_ACTION_INTERVAL)?;
        }

        if source.is_set(keys::SHELL_ACTION_COMMAND) {
            next.shell_action_command = source.get_string(keys::SHELL_ACTION_COMMAND)?;
        }

        if source.is_set(keys::FAULT_ACTION_PROBABILITY) {
            next.fault_action_probability = source.get_f64(keys::FAULT_ACTION_PROBABILITY)?;
        }

        if source.is_set(keys::PROC_RESET_SCHED_PROBABILITY) {
            next.proc_reset_sched_probability =
                source.get_f64(keys::PROC_RESET_SCHED_PROBABILITY)?;
        }

        next.validate()?;
        Ok(next)
    }
}

fn check_probability(key: &str, value: f64) -> Result<(), ApplicationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ApplicationError::invalid_parameter(
            key,
            format!("probability must be in [0, 1], got {value}"),
        ))
    }
}
