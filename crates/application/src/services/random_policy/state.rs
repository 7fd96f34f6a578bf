//! State shared between the engine handle and its background tasks

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use arc_swap::ArcSwap;
use domain::{Action, ActionKind, DomainError, Event};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::error::ApplicationError;
use crate::ports::TimeBoundedQueue;
use crate::services::decision::{ProcSchedStrategy, decide};
use crate::services::engine_stats::EngineCounters;
use crate::services::policy_params::PolicyParams;

pub(super) struct EngineState {
    pub(super) params: ArcSwap<PolicyParams>,
    /// Bumped on every applied configuration load
    pub(super) version: watch::Sender<u64>,
    pub(super) shutdown: watch::Sender<bool>,
    /// Taken on shutdown so the action stream ends once the tasks exit
    pub(super) actions: Mutex<Option<mpsc::Sender<Action>>>,
    pub(super) queue: Arc<dyn TimeBoundedQueue<Event>>,
    pub(super) strategy: Arc<dyn ProcSchedStrategy>,
    pub(super) failure: Mutex<Option<String>>,
    pub(super) counters: EngineCounters,
    pub(super) shell_started: AtomicBool,
    pub(super) shell_running: AtomicBool,
}

impl EngineState {
    pub(super) fn new(
        queue: Arc<dyn TimeBoundedQueue<Event>>,
        strategy: Arc<dyn ProcSchedStrategy>,
        actions: mpsc::Sender<Action>,
    ) -> Self {
        let (version, _) = watch::channel(0);
        let (shutdown, _) = watch::channel(false);
        Self {
            params: ArcSwap::from_pointee(PolicyParams::default()),
            version,
            shutdown,
            actions: Mutex::new(Some(actions)),
            queue,
            strategy,
            failure: Mutex::new(None),
            counters: EngineCounters::default(),
            shell_started: AtomicBool::new(false),
            shell_running: AtomicBool::new(false),
        }
    }

    pub(super) fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Clone the output sender, unless the engine is shut down
    pub(super) fn action_sender(&self) -> Option<mpsc::Sender<Action>> {
        self.actions.lock().clone()
    }

    /// Signal both loops to stop, close the queue and release the output
    /// sender; returns `false` when already shut down
    pub(super) fn begin_shutdown(&self) -> bool {
        if self.shutdown.send_replace(true) {
            return false;
        }
        self.queue.close();
        self.actions.lock().take();
        let stats = self.counters.snapshot();
        info!(
            events_queued = stats.events_queued,
            decisions = stats.decisions,
            faults_injected = stats.faults_injected,
            fault_rate = stats.actual_fault_rate(),
            shell_actions = stats.shell_actions,
            "Explore policy shut down"
        );
        true
    }

    /// Record a fatal error and shut down
    pub(super) fn fail(&self, reason: String) {
        {
            let mut failure = self.failure.lock();
            if failure.is_none() {
                *failure = Some(reason);
            }
        }
        self.begin_shutdown();
    }

    /// Error returned to callers once the engine no longer runs
    pub(super) fn stopped_error(&self) -> ApplicationError {
        self.failure
            .lock()
            .clone()
            .map_or(ApplicationError::EngineStopped, ApplicationError::EngineFailed)
    }

    /// Decide on a released event with the current parameters
    pub(super) fn decide(&self, event: &Event) -> Result<Action, DomainError> {
        let params = self.params.load();
        let action = decide(event, &params, self.strategy.as_ref(), &mut rand::rng())?;
        let reset = matches!(action.kind, ActionKind::ProcSchedReset { .. });
        self.counters.record_decision(action.is_fault(), reset);
        debug!(event = %event, action = action.class(), "Decided on event");
        Ok(action)
    }
}

/// Resolve once shutdown has been signalled
pub(super) async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    // The sender lives in `EngineState`, which outlives every receiver
    let _ = rx.wait_for(|stopped| *stopped).await;
}

/// Hand an action to the consumer, giving up when shutdown is signalled first
///
/// Returns only once the consumer has taken the action off the channel: the
/// single buffer slot must be free again before the producer moves on, so a
/// stalled consumer stalls the producer instead of letting it run one action
/// ahead.
pub(super) async fn emit(
    tx: &mpsc::Sender<Action>,
    action: Action,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    let handoff = async {
        if tx.send(action).await.is_err() {
            return false;
        }
        // the permit is released straight away
        tx.reserve().await.is_ok()
    };
    tokio::select! {
        delivered = handoff => delivered,
        () = shutdown_signalled(shutdown) => false,
    }
}
