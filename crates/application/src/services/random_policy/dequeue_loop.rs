//! Dequeue-and-decide loop

use std::sync::Arc;

use domain::Action;
use tokio::sync::mpsc;
use tracing::{debug, error};

use super::state::{EngineState, emit, shutdown_signalled};

/// Take released events off the queue, decide on each and emit the result
///
/// A decision error is fatal: it is recorded, the engine shuts down and the
/// action stream ends.
pub(super) async fn run(state: Arc<EngineState>, tx: mpsc::Sender<Action>) {
    let mut shutdown = state.shutdown.subscribe();
    debug!("Dequeue loop started");

    loop {
        let item = tokio::select! {
            item = state.queue.dequeue() => item,
            () = shutdown_signalled(&mut shutdown) => None,
        };
        let Some(item) = item else {
            break;
        };

        let event = item.into_value();
        let action = match state.decide(&event) {
            Ok(action) => action,
            Err(e) => {
                error!(
                    event = %event,
                    error = %e,
                    "No action for released event, stopping explore policy"
                );
                state.fail(format!("{e} (event {event})"));
                break;
            },
        };

        if !emit(&tx, action, &mut shutdown).await {
            break;
        }
    }

    debug!("Dequeue loop stopped");
}
