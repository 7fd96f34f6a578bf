//! Domain entities - Objects with identity and lifecycle

mod action;
mod event;
mod trace;

pub use action::{Action, ActionKind, DEFAULT_FILESYSTEM_ERRNO};
pub use event::{Event, EventKind, FilesystemOp, SchedAttrs};
pub use trace::{SingleTrace, TraceStep, step_digest};
