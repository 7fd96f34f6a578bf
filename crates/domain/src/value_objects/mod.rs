//! Value Objects - Immutable, identity-less domain primitives

mod entity_id;
mod event_id;

pub use entity_id::{EXPLORER_ENTITY, EntityId};
pub use event_id::{ActionId, EventId};
