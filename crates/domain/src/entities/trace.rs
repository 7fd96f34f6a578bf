//! Executed traces: ordered action/event pairs of one test run

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::event::Event;

/// Content digest of an action/event pair
///
/// Covers the action class, the event class and the event content, but not
/// the ids, so equal steps from different runs share a digest.
pub fn step_digest(action: &Action, event: &Event) -> String {
    let option = serde_json::to_string(&event.option()).unwrap_or_default();
    let mut hasher = blake3::Hasher::new();
    hasher.update(action.class().as_bytes());
    hasher.update(&[0]);
    hasher.update(event.class().as_bytes());
    hasher.update(&[0]);
    hasher.update(option.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// One step of a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// The observed event
    pub event: Event,
    /// The action applied for it
    pub action: Action,
    /// Content digest of the pair
    pub digest: String,
}

impl TraceStep {
    /// Create a step, computing its digest
    pub fn new(event: Event, action: Action) -> Self {
        let digest = step_digest(&action, &event);
        Self {
            event,
            action,
            digest,
        }
    }
}

/// A completed trace, ready to be handed to history storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleTrace {
    steps: Vec<TraceStep>,
}

impl SingleTrace {
    /// Create an empty trace
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append an action/event pair
    pub fn record(&mut self, event: Event, action: Action) {
        self.steps.push(TraceStep::new(event, action));
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trace is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Observed events in order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.steps.iter().map(|s| &s.event)
    }

    /// Whether this trace's event sequence starts with `prefix`
    ///
    /// Events are compared by content, not by id.
    pub fn starts_with_events(&self, prefix: &[Event]) -> bool {
        prefix.len() <= self.steps.len()
            && prefix
                .iter()
                .zip(self.events())
                .all(|(want, got)| want.same_observation(got))
    }
}
