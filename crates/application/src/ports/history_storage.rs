//! History storage port
//!
//! Persistence of executed traces for later replay and prefix search.
//! Policies receive a storage handle but are free to ignore it.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Event, SingleTrace};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for trace/history persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryStoragePort: Send + Sync {
    /// Storage backend name
    fn name(&self) -> &'static str;

    /// Store a completed trace
    async fn record_new_trace(&self, trace: &SingleTrace) -> Result<(), ApplicationError>;

    /// Record the outcome of the most recent trace
    async fn record_result(
        &self,
        succeed: bool,
        required_time: Duration,
    ) -> Result<(), ApplicationError>;

    /// Number of stored traces
    async fn stored_history_count(&self) -> Result<usize, ApplicationError>;

    /// Fetch a stored trace by numeric id
    async fn get_stored_history(&self, id: usize) -> Result<SingleTrace, ApplicationError>;

    /// Whether the run with this id succeeded
    async fn is_succeed(&self, id: usize) -> Result<bool, ApplicationError>;

    /// Wall time the run with this id took
    async fn get_required_time(&self, id: usize) -> Result<Duration, ApplicationError>;

    /// Ids of stored traces whose event sequence starts with `prefix`
    async fn search(&self, prefix: &[Event]) -> Result<Vec<usize>, ApplicationError>;
}
