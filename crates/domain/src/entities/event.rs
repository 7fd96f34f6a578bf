//! Events: observations reported by instrumentation of the system under test
//!
//! Every event kind has a fixed capability row: the action that happens
//! absent any interference, and optionally a fault variant of it.
//!
//! | kind         | default action   | default fault action |
//! |--------------|------------------|----------------------|
//! | `Generic`    | `Accept`         | none                 |
//! | `Packet`     | `Accept`         | `PacketFault`        |
//! | `Filesystem` | `Accept`         | `FilesystemFault`    |
//! | `ProcSet`    | `ProcSetSched`   | none                 |
//! | `Log`        | error            | none                 |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::{Action, ActionKind, DEFAULT_FILESYSTEM_ERRNO};
use crate::errors::DomainError;
use crate::value_objects::{EntityId, EventId};

/// Scheduling attributes requested for one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedAttrs {
    /// Scheduling policy name, e.g. `SCHED_BATCH`
    pub policy: String,
    /// Nice value or static priority, depending on the policy
    #[serde(default)]
    pub priority: i32,
}

/// Filesystem operation intercepted by the instrumentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilesystemOp {
    Open,
    Read,
    Write,
    Mkdir,
    Rmdir,
    Unlink,
    Fsync,
}

impl fmt::Display for FilesystemOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Write => "write",
            Self::Mkdir => "mkdir",
            Self::Rmdir => "rmdir",
            Self::Unlink => "unlink",
            Self::Fsync => "fsync",
        };
        f.write_str(s)
    }
}

/// Variant-specific payload of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum EventKind {
    /// Generic instrumentation event (function call, state transition, ...)
    Generic {
        class: String,
        #[serde(default)]
        option: serde_json::Map<String, Value>,
    },

    /// A packet about to be delivered between two entities
    Packet {
        src_entity: EntityId,
        dst_entity: EntityId,
        #[serde(default)]
        message: Value,
    },

    /// A filesystem operation about to be performed
    Filesystem { op: FilesystemOp, path: String },

    /// A process-scheduling change request (pid -> attributes)
    ProcSet { attrs: BTreeMap<String, SchedAttrs> },

    /// A log line; recorded in traces but never decided on
    Log { message: String },
}

/// An observed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event id (generated when absent from the wire)
    #[serde(default)]
    pub id: EventId,
    /// Participant that produced the event
    pub entity: EntityId,
    /// Variant-specific payload
    pub kind: EventKind,
}

impl Event {
    /// Create a new event with a fresh id
    pub fn new(entity: EntityId, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            entity,
            kind,
        }
    }

    /// Participant that produced the event
    pub const fn entity_id(&self) -> &EntityId {
        &self.entity
    }

    /// Stable class name of the event kind
    pub const fn class(&self) -> &'static str {
        match self.kind {
            EventKind::Generic { .. } => "GenericEvent",
            EventKind::Packet { .. } => "PacketEvent",
            EventKind::Filesystem { .. } => "FilesystemEvent",
            EventKind::ProcSet { .. } => "ProcSetEvent",
            EventKind::Log { .. } => "LogEvent",
        }
    }

    /// What happens absent any test interference
    pub fn default_action(&self) -> Result<Action, DomainError> {
        let kind = match &self.kind {
            EventKind::Generic { .. }
            | EventKind::Packet { .. }
            | EventKind::Filesystem { .. } => ActionKind::Accept,
            EventKind::ProcSet { attrs } => ActionKind::ProcSetSched {
                attrs: attrs.clone(),
            },
            EventKind::Log { .. } => return Err(DomainError::no_default_action(self.class())),
        };
        Ok(Action::for_event(self, kind))
    }

    /// The fault variant of the default action, if this kind has one
    pub fn default_fault_action(&self) -> Result<Option<Action>, DomainError> {
        let kind = match &self.kind {
            EventKind::Packet { .. } => ActionKind::PacketFault,
            EventKind::Filesystem { .. } => ActionKind::FilesystemFault {
                errno: DEFAULT_FILESYSTEM_ERRNO.to_string(),
            },
            EventKind::Generic { .. } | EventKind::ProcSet { .. } | EventKind::Log { .. } => {
                return Ok(None);
            },
        };
        Ok(Some(Action::for_event(self, kind)))
    }

    /// Content of the event without its identity, used for trace digests
    /// and prefix comparison
    pub fn option(&self) -> Value {
        match &self.kind {
            EventKind::Generic { class, option } => {
                serde_json::json!({ "class": class, "option": option })
            },
            EventKind::Packet {
                src_entity,
                dst_entity,
                message,
            } => serde_json::json!({
                "src_entity": src_entity,
                "dst_entity": dst_entity,
                "message": message,
            }),
            EventKind::Filesystem { op, path } => {
                serde_json::json!({ "op": op, "path": path })
            },
            EventKind::ProcSet { attrs } => serde_json::json!({ "attrs": attrs }),
            EventKind::Log { message } => serde_json::json!({ "message": message }),
        }
    }

    /// Whether two events describe the same observation, ignoring ids
    pub fn same_observation(&self, other: &Self) -> bool {
        self.entity == other.entity && self.class() == other.class() && self.option() == other.option()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]@{}", self.class(), self.id, self.entity)
    }
}
