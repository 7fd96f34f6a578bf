//! Exploration policy port
//!
//! An exploration policy turns observed events into actions. It is fed via
//! [`ExplorePolicy::queue_event`] and emits on a single action stream that the
//! orchestrator drains.

use std::sync::Arc;

use domain::{Action, Event};
use tokio::sync::mpsc;

use super::{HistoryStoragePort, ParamSource};
use crate::error::ApplicationError;

/// Decision engine interface used by the orchestrator
pub trait ExplorePolicy: Send + Sync {
    /// Policy name as used in the `explorePolicy` configuration key
    fn name(&self) -> &'static str;

    /// Apply the parameters present in `source`; may be called repeatedly
    fn load_config(&self, source: &dyn ParamSource) -> Result<(), ApplicationError>;

    /// Submit an observed event for a decision
    ///
    /// An error is fatal for the engine: it indicates a broken caller contract
    /// or an inconsistent configuration.
    fn queue_event(&self, event: Event) -> Result<(), ApplicationError>;

    /// Take the action stream; only the first call returns `Some`
    fn take_action_receiver(&self) -> Option<mpsc::Receiver<Action>>;

    /// Hand over a history storage
    fn set_history_storage(
        &self,
        storage: Arc<dyn HistoryStoragePort>,
    ) -> Result<(), ApplicationError>;

    /// Reason the policy stopped on its own, if it did
    fn failure(&self) -> Option<String> {
        None
    }

    /// Stop all background work; the action stream ends afterwards
    fn shutdown(&self);
}
