//! Engine statistics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Events accepted by `queue_event`
    pub events_queued: u64,
    /// Events released by the queue and decided on
    pub decisions: u64,
    /// Decisions that produced a fault action
    pub faults_injected: u64,
    /// Process-scheduling decisions that reset scheduling
    pub proc_sched_resets: u64,
    /// Shell actions emitted by the periodic loop
    pub shell_actions: u64,
}

impl EngineStats {
    /// Fraction of decisions that injected a fault
    #[allow(clippy::cast_precision_loss)]
    pub fn actual_fault_rate(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.faults_injected as f64 / self.decisions as f64
        }
    }
}

/// Lock-free counters shared by the engine tasks
#[derive(Debug, Default)]
pub(crate) struct EngineCounters {
    events_queued: AtomicU64,
    decisions: AtomicU64,
    faults_injected: AtomicU64,
    proc_sched_resets: AtomicU64,
    shell_actions: AtomicU64,
}

impl EngineCounters {
    pub(crate) fn record_queued(&self) {
        self.events_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decision(&self, fault: bool, reset: bool) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        if fault {
            self.faults_injected.fetch_add(1, Ordering::Relaxed);
        }
        if reset {
            self.proc_sched_resets.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_shell_action(&self) {
        self.shell_actions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EngineStats {
        EngineStats {
            events_queued: self.events_queued.load(Ordering::Relaxed),
            decisions: self.decisions.load(Ordering::Relaxed),
            faults_injected: self.faults_injected.load(Ordering::Relaxed),
            proc_sched_resets: self.proc_sched_resets.load(Ordering::Relaxed),
            shell_actions: self.shell_actions.load(Ordering::Relaxed),
        }
    }
}
