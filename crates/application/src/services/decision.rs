//! Event to action decision
//!
//! Maps a released event to the action the orchestrator applies next,
//! injecting the event's fault variant with the configured probability.

use std::collections::BTreeMap;
use std::fmt;

use domain::{Action, ActionKind, DomainError, Event, EventKind, SchedAttrs};
use rand::{Rng, RngCore};
use tracing::debug;

use super::policy_params::PolicyParams;

/// Number of equally likely outcomes of a weighted trial
const TRIAL_RESOLUTION: u32 = 999;

/// Weighted trial: draw uniformly from `0..999` and hit when the draw is
/// below `floor(probability * 1000)`
///
/// A probability of 0.0 never hits and 1.0 always hits.
#[allow(clippy::cast_possible_truncation)]
pub fn weighted_trial(probability: f64, rng: &mut dyn RngCore) -> bool {
    let threshold = (probability * 1000.0).floor() as i64;
    let draw = i64::from(rng.random_range(0..TRIAL_RESOLUTION));
    draw < threshold
}

/// Decision rule for process-scheduling events
///
/// The random policy hands every `ProcSet` event to a strategy, so the rule
/// can be swapped without touching the engine.
pub trait ProcSchedStrategy: Send + Sync + fmt::Debug {
    /// Decide on a process-scheduling event
    fn decide(
        &self,
        event: &Event,
        attrs: &BTreeMap<String, SchedAttrs>,
        reset_probability: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DomainError>;
}

/// Default strategy: with the reset probability, reset scheduling of every
/// process named by the event; otherwise apply the requested attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetOrApply;

impl ProcSchedStrategy for ResetOrApply {
    fn decide(
        &self,
        event: &Event,
        attrs: &BTreeMap<String, SchedAttrs>,
        reset_probability: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DomainError> {
        if weighted_trial(reset_probability, rng) {
            // BTreeMap keys are already sorted
            let procs = attrs.keys().cloned().collect();
            return Ok(Action::for_event(event, ActionKind::ProcSchedReset { procs }));
        }
        event.default_action()
    }
}

/// Decide on an event using the given parameter snapshot
///
/// Errors mean the event kind has no default action and must be treated as
/// fatal by the caller.
pub fn decide(
    event: &Event,
    params: &PolicyParams,
    strategy: &dyn ProcSchedStrategy,
    rng: &mut dyn RngCore,
) -> Result<Action, DomainError> {
    if let EventKind::ProcSet { attrs } = &event.kind {
        return strategy.decide(event, attrs, params.proc_reset_sched_probability, rng);
    }

    let action = event.default_action()?;
    let Some(fault) = event.default_fault_action()? else {
        return Ok(action);
    };

    if weighted_trial(params.fault_action_probability, rng) {
        debug!(
            event = %event,
            fault = fault.class(),
            probability = params.fault_action_probability,
            "Injecting fault action"
        );
        return Ok(fault);
    }
    Ok(action)
}
