//! Entity identifier value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Entity id used for actions emitted by the explorer itself rather than on
/// behalf of an instrumented participant
pub const EXPLORER_ENTITY: &str = "_explorer";

/// Identifier of an addressable participant (process/node) of the system under test
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    value: String,
}

impl EntityId {
    /// Create a new entity id
    ///
    /// Surrounding whitespace is trimmed; the result must not be empty.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let value = id.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::InvalidEntityId(
                "Entity id must not be empty".to_string(),
            ));
        }
        Ok(Self { value })
    }

    /// The reserved id for explorer-originated actions
    pub fn explorer() -> Self {
        Self {
            value: EXPLORER_ENTITY.to_string(),
        }
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether this is the reserved explorer id
    pub fn is_explorer(&self) -> bool {
        self.value == EXPLORER_ENTITY
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for EntityId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.value
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
