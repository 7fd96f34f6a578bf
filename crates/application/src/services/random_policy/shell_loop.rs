//! Periodic shell action loop
//!
//! Started once per engine. Each cycle re-reads the parameter snapshot, so
//! interval and command changes apply from the next cycle. A zero interval
//! parks the loop until the next configuration change instead of stopping it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use domain::Action;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::state::{EngineState, emit, shutdown_signalled};

/// Annotation attached to every shell action
pub const SHELL_COMMENT: &str = "injected by the random explorer";

pub(super) fn shell_comments() -> BTreeMap<String, String> {
    BTreeMap::from([("comment".to_string(), SHELL_COMMENT.to_string())])
}

pub(super) async fn run(state: Arc<EngineState>, tx: mpsc::Sender<Action>) {
    let mut shutdown = state.shutdown.subscribe();
    let mut version = state.version.subscribe();
    info!("Shell action loop started");

    loop {
        version.mark_unchanged();
        let interval = state.params.load().shell_action_interval;

        if interval.is_zero() {
            debug!("Shell action interval is zero, waiting for reconfiguration");
            tokio::select! {
                changed = version.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
                () = shutdown_signalled(&mut shutdown) => break,
            }
            continue;
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {},
            () = shutdown_signalled(&mut shutdown) => break,
        }

        let params = state.params.load_full();
        if !params.shell_enabled() {
            continue;
        }

        let action = Action::shell(params.shell_action_command.clone(), shell_comments());
        debug!(command = %params.shell_action_command, "Emitting shell action");
        if !emit(&tx, action, &mut shutdown).await {
            break;
        }
        state.counters.record_shell_action();
    }

    state.shell_running.store(false, Ordering::SeqCst);
    info!("Shell action loop stopped");
}
