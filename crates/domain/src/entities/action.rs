//! Actions: directives the orchestrator applies to the system under test

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::{Event, SchedAttrs};
use crate::value_objects::{ActionId, EntityId, EventId};

/// Errno injected by a filesystem fault unless the caller picks another one
pub const DEFAULT_FILESYSTEM_ERRNO: &str = "EIO";

/// What the orchestrator should do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum ActionKind {
    /// Let the observed event proceed as normal
    Accept,

    /// Do nothing
    Nop,

    /// Run an external shell command on the orchestrator side
    Shell {
        command: String,
        #[serde(default)]
        comments: BTreeMap<String, String>,
    },

    /// Drop the packet the event describes
    PacketFault,

    /// Fail the filesystem operation the event describes
    FilesystemFault { errno: String },

    /// Apply the requested scheduling attributes (pid -> attributes)
    ProcSetSched { attrs: BTreeMap<String, SchedAttrs> },

    /// Reset scheduling of the listed pids to the platform default
    ProcSchedReset { procs: Vec<String> },
}

impl ActionKind {
    /// Stable class name, used for trace digests and logging
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Accept => "AcceptEventAction",
            Self::Nop => "NopAction",
            Self::Shell { .. } => "ShellAction",
            Self::PacketFault => "PacketFaultAction",
            Self::FilesystemFault { .. } => "FilesystemFaultAction",
            Self::ProcSetSched { .. } => "ProcSetSchedAction",
            Self::ProcSchedReset { .. } => "ProcSchedResetAction",
        }
    }
}

/// A directive produced by an exploration policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unique action id
    pub id: ActionId,
    /// Entity the action targets
    pub entity: EntityId,
    /// Event this action answers, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// What to do
    pub kind: ActionKind,
}

impl Action {
    /// Create an action answering the given event
    pub fn for_event(event: &Event, kind: ActionKind) -> Self {
        Self {
            id: ActionId::new(),
            entity: event.entity.clone(),
            event_id: Some(event.id),
            kind,
        }
    }

    /// Create an explorer-originated shell action
    pub fn shell(command: impl Into<String>, comments: BTreeMap<String, String>) -> Self {
        Self {
            id: ActionId::new(),
            entity: EntityId::explorer(),
            event_id: None,
            kind: ActionKind::Shell {
                command: command.into(),
                comments,
            },
        }
    }

    /// Stable class name of the action kind
    pub const fn class(&self) -> &'static str {
        self.kind.class()
    }

    /// Whether applying this action deliberately induces a failure
    pub const fn is_fault(&self) -> bool {
        matches!(
            self.kind,
            ActionKind::PacketFault | ActionKind::FilesystemFault { .. } | ActionKind::Shell { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EventKind;

    fn packet_event() -> Event {
        Event::new(
            EntityId::new("node-a").unwrap(),
            EventKind::Packet {
                src_entity: EntityId::new("node-a").unwrap(),
                dst_entity: EntityId::new("node-b").unwrap(),
                message: serde_json::Value::Null,
            },
        )
    }

    #[test]
    fn for_event_links_entity_and_event() {
        let event = packet_event();
        let action = Action::for_event(&event, ActionKind::Accept);
        assert_eq!(action.entity, event.entity);
        assert_eq!(action.event_id, Some(event.id));
    }

    #[test]
    fn shell_action_targets_explorer() {
        let action = Action::shell("kill -9 1234", BTreeMap::new());
        assert!(action.entity.is_explorer());
        assert!(action.event_id.is_none());
        assert!(matches!(action.kind, ActionKind::Shell { ref command, .. } if command == "kill -9 1234"));
    }

    #[test]
    fn fault_classification() {
        let event = packet_event();
        assert!(!Action::for_event(&event, ActionKind::Accept).is_fault());
        assert!(!Action::for_event(&event, ActionKind::Nop).is_fault());
        assert!(Action::for_event(&event, ActionKind::PacketFault).is_fault());
        assert!(
            Action::for_event(
                &event,
                ActionKind::FilesystemFault {
                    errno: DEFAULT_FILESYSTEM_ERRNO.to_string()
                }
            )
            .is_fault()
        );
        assert!(Action::shell("true", BTreeMap::new()).is_fault());
        assert!(
            !Action::for_event(&event, ActionKind::ProcSchedReset { procs: vec![] }).is_fault()
        );
    }

    #[test]
    fn class_names_are_stable() {
        assert_eq!(ActionKind::Accept.class(), "AcceptEventAction");
        assert_eq!(ActionKind::PacketFault.class(), "PacketFaultAction");
        assert_eq!(
            ActionKind::ProcSchedReset { procs: vec![] }.class(),
            "ProcSchedResetAction"
        );
    }

    #[test]
    fn action_serialization_is_tagged() {
        let action = Action::shell("echo hi", BTreeMap::new());
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"]["type"], "Shell");
        assert_eq!(json["kind"]["params"]["command"], "echo hi");
        assert_eq!(json["entity"], "_explorer");
        assert!(json.get("event_id").is_none());

        let parsed: Action = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, action);
    }
}
