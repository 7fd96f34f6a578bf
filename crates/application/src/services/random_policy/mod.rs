//! Random exploration policy
//!
//! Events are delayed by the time-bounded queue for a random time within the
//! configured window, then answered with either their default action or,
//! with the configured probability, their fault action. Optionally a shell
//! action is injected at a fixed cadence. Both producers share one action
//! stream.
//!
//! Parameters are held in an immutable snapshot swapped as a whole on every
//! successful [`RandomPolicy::load_config`], so the background tasks never
//! observe a half-applied configuration.

mod dequeue_loop;
mod shell_loop;
mod state;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use domain::{Action, Event};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub use shell_loop::SHELL_COMMENT;

use self::state::EngineState;
use super::decision::{ProcSchedStrategy, ResetOrApply};
use super::engine_stats::EngineStats;
use super::policy_params::{PolicyParams, keys};
use crate::error::ApplicationError;
use crate::ports::{
    ExplorePolicy, HistoryStoragePort, ParamSource, QueueError, QueueItem, TimeBoundedQueue,
};

/// Name of this policy in the `explorePolicy` key
pub const POLICY_NAME: &str = "random";

/// Output channel capacity; producers additionally wait for the slot to drain,
/// which turns every send into a rendezvous with the consumer
const ACTION_CHANNEL_CAPACITY: usize = 1;

/// Random exploration policy engine
pub struct RandomPolicy {
    state: Arc<EngineState>,
    runtime: Handle,
    receiver: Mutex<Option<mpsc::Receiver<Action>>>,
    /// Serialises configuration loads
    load_lock: Mutex<()>,
}

impl fmt::Debug for RandomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomPolicy")
            .field("params", &self.state.params.load_full())
            .field("shut_down", &self.state.is_shut_down())
            .field("stats", &self.state.counters.snapshot())
            .finish_non_exhaustive()
    }
}

impl RandomPolicy {
    /// Create an engine on the current tokio runtime and start its dequeue
    /// loop
    pub fn new(queue: Arc<dyn TimeBoundedQueue<Event>>) -> Result<Self, ApplicationError> {
        Self::with_strategy(queue, Arc::new(ResetOrApply))
    }

    /// Create an engine with a custom process-scheduling strategy
    pub fn with_strategy(
        queue: Arc<dyn TimeBoundedQueue<Event>>,
        strategy: Arc<dyn ProcSchedStrategy>,
    ) -> Result<Self, ApplicationError> {
        let runtime =
            Handle::try_current().map_err(|e| ApplicationError::RuntimeUnavailable(e.to_string()))?;
        let (tx, rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
        let state = Arc::new(EngineState::new(queue, strategy, tx.clone()));

        runtime.spawn(dequeue_loop::run(Arc::clone(&state), tx));

        Ok(Self {
            state,
            runtime,
            receiver: Mutex::new(Some(rx)),
            load_lock: Mutex::new(()),
        })
    }

    /// Apply the parameters present in `source`
    ///
    /// All supplied values are validated before any of them takes effect; on
    /// error the previous configuration stays in place.
    pub fn load_config(&self, source: &dyn ParamSource) -> Result<(), ApplicationError> {
        let _guard = self.load_lock.lock();
        if self.state.is_shut_down() {
            return Err(self.state.stopped_error());
        }

        let configured = if source.is_set(keys::EXPLORE_POLICY) {
            source.get_string(keys::EXPLORE_POLICY)?
        } else {
            String::new()
        };
        if configured != POLICY_NAME {
            warn!(
                configured = %configured,
                policy = POLICY_NAME,
                "Configured explore policy does not match this policy"
            );
        }

        let next = self.state.params.load().apply(source)?;

        if !next.shell_enabled() && !next.shell_action_command.is_empty() {
            warn!(
                command = %next.shell_action_command,
                "shellActionCommand is set but shellActionInterval is 0, command is unused"
            );
        }

        info!(
            min_interval = ?next.min_interval,
            max_interval = ?next.max_interval,
            prioritized_entities = next.prioritized_entities.len(),
            shell_action_interval = ?next.shell_action_interval,
            fault_action_probability = next.fault_action_probability,
            proc_reset_sched_probability = next.proc_reset_sched_probability,
            "Applied explore policy parameters"
        );

        let start_shell = next.shell_enabled();
        self.state.params.store(Arc::new(next));
        self.state.version.send_modify(|version| *version += 1);

        if start_shell {
            self.ensure_shell_loop();
        }
        Ok(())
    }

    fn ensure_shell_loop(&self) {
        if self.state.shell_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(tx) = self.state.action_sender() else {
            return;
        };
        self.state.shell_running.store(true, Ordering::SeqCst);
        self.runtime.spawn(shell_loop::run(Arc::clone(&self.state), tx));
    }

    /// Submit an event; its decision is emitted after a random delay within
    /// the (possibly prioritized) interval window
    pub fn queue_event(&self, event: Event) -> Result<(), ApplicationError> {
        if self.state.is_shut_down() {
            return Err(self.state.stopped_error());
        }

        let (min, max) = self.state.params.load().intervals_for(event.entity_id());
        let label = event.to_string();
        let item = QueueItem::new(event, min, max).map_err(|e| {
            error!(
                event = %label,
                error = %e,
                "Cannot schedule event, stopping explore policy"
            );
            self.state.fail(format!("{e} (event {label})"));
            ApplicationError::InvariantViolation(e.to_string())
        })?;

        self.state.queue.enqueue(item).map_err(|e| match e {
            QueueError::Closed => self.state.stopped_error(),
            other => ApplicationError::Queue(other),
        })?;

        self.state.counters.record_queued();
        debug!(event = %label, ?min, ?max, "Queued event");
        Ok(())
    }

    /// Take the action stream; only the first call returns `Some`
    pub fn take_action_receiver(&self) -> Option<mpsc::Receiver<Action>> {
        self.receiver.lock().take()
    }

    /// Current parameter snapshot
    pub fn params(&self) -> Arc<PolicyParams> {
        self.state.params.load_full()
    }

    /// Counters since creation
    pub fn stats(&self) -> EngineStats {
        self.state.counters.snapshot()
    }

    /// Reason the engine stopped on its own, if it did
    pub fn failure(&self) -> Option<String> {
        self.state.failure.lock().clone()
    }

    /// Whether the shell action loop has been started and not yet stopped
    pub fn shell_loop_running(&self) -> bool {
        self.state.shell_running.load(Ordering::SeqCst)
    }

    /// Whether the engine has been shut down
    pub fn is_shut_down(&self) -> bool {
        self.state.is_shut_down()
    }

    /// Stop both loops; the action stream ends once they exit
    pub fn shutdown(&self) {
        self.state.begin_shutdown();
    }
}

impl Drop for RandomPolicy {
    fn drop(&mut self) {
        self.state.begin_shutdown();
    }
}

impl ExplorePolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        POLICY_NAME
    }

    fn load_config(&self, source: &dyn ParamSource) -> Result<(), ApplicationError> {
        Self::load_config(self, source)
    }

    fn queue_event(&self, event: Event) -> Result<(), ApplicationError> {
        Self::queue_event(self, event)
    }

    fn take_action_receiver(&self) -> Option<mpsc::Receiver<Action>> {
        Self::take_action_receiver(self)
    }

    fn set_history_storage(
        &self,
        storage: Arc<dyn HistoryStoragePort>,
    ) -> Result<(), ApplicationError> {
        debug!(storage = storage.name(), "Random policy does not use history storage");
        Ok(())
    }

    fn failure(&self) -> Option<String> {
        Self::failure(self)
    }

    fn shutdown(&self) {
        Self::shutdown(self);
    }
}
