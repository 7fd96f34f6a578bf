//! Time-bounded queue port
//!
//! A scheduling primitive that releases each enqueued value no earlier than
//! its minimum delay and no later than its maximum delay after enqueue.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a time-bounded queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The release window is empty
    #[error("Invalid delay bounds: min {min:?} exceeds max {max:?}")]
    InvalidBounds { min: Duration, max: Duration },

    /// The queue no longer accepts items
    #[error("Queue is closed")]
    Closed,
}

/// A value together with its release window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem<T> {
    value: T,
    min_delay: Duration,
    max_delay: Duration,
}

impl<T> QueueItem<T> {
    /// Create an item, rejecting `min_delay > max_delay`
    ///
    /// Negative delays cannot be expressed with [`Duration`].
    pub fn new(value: T, min_delay: Duration, max_delay: Duration) -> Result<Self, QueueError> {
        if min_delay > max_delay {
            return Err(QueueError::InvalidBounds {
                min: min_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            value,
            min_delay,
            max_delay,
        })
    }

    /// Borrow the value
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Take the value
    pub fn into_value(self) -> T {
        self.value
    }

    /// Earliest release delay
    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Latest release delay
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

/// A queue releasing items within their delay window
///
/// Any number of callers may enqueue concurrently; released items form one
/// logical consumer stream read through [`TimeBoundedQueue::dequeue`].
#[async_trait]
pub trait TimeBoundedQueue<T: Send + 'static>: Send + Sync {
    /// Submit an item
    fn enqueue(&self, item: QueueItem<T>) -> Result<(), QueueError>;

    /// Wait for the next released item
    ///
    /// Returns `None` once the queue is closed. Must be cancel safe: dropping
    /// the returned future loses no item.
    async fn dequeue(&self) -> Option<QueueItem<T>>;

    /// Number of items not yet released
    fn len(&self) -> usize;

    /// Whether no items are pending
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting items and wake pending consumers
    fn close(&self);
}
