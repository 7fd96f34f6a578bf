//! Earliest-deadline-first time-bounded queue
//!
//! Every enqueued item gets a release deadline drawn uniformly from its
//! window. Items are released in deadline order; equal deadlines keep their
//! enqueue order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use application::ports::{QueueError, QueueItem, TimeBoundedQueue};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

struct Pending<T> {
    release_at: Instant,
    seq: u64,
    item: QueueItem<T>,
}

impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release_at
            .cmp(&other.release_at)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Pending<T> {}

struct Inner<T> {
    heap: BinaryHeap<Reverse<Pending<T>>>,
    next_seq: u64,
    closed: bool,
}

/// In-memory time-bounded queue backed by a min-heap of deadlines
pub struct BasicTimeBoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
}

impl<T> std::fmt::Debug for BasicTimeBoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BasicTimeBoundedQueue")
            .field("pending", &inner.heap.len())
            .field("closed", &inner.closed)
            .finish_non_exhaustive()
    }
}

impl<T> Default for BasicTimeBoundedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BasicTimeBoundedQueue<T> {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                next_seq: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Whether [`TimeBoundedQueue::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

/// Draw a delay uniformly from `[min, max]`
fn release_delay(min: Duration, max: Duration) -> Duration {
    if min >= max {
        return min;
    }
    let span = (max - min).as_nanos();
    let offset = rand::rng().random_range(0..=span);
    min + Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX))
}

#[async_trait]
impl<T: Send + 'static> TimeBoundedQueue<T> for BasicTimeBoundedQueue<T> {
    fn enqueue(&self, item: QueueItem<T>) -> Result<(), QueueError> {
        let delay = release_delay(item.min_delay(), item.max_delay());
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(QueueError::Closed);
            }
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.heap.push(Reverse(Pending {
                release_at: Instant::now() + delay,
                seq,
                item,
            }));
            trace!(seq, ?delay, pending = inner.heap.len(), "Enqueued item");
        }
        self.notify.notify_waiters();
        Ok(())
    }

    async fn dequeue(&self) -> Option<QueueItem<T>> {
        loop {
            // Register before inspecting the heap so a concurrent enqueue or
            // close between the check and the wait is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next_deadline = {
                let mut inner = self.inner.lock();
                if inner.closed {
                    return None;
                }
                match inner.heap.peek().map(|Reverse(head)| head.release_at) {
                    Some(deadline) if deadline <= Instant::now() => {
                        return inner.heap.pop().map(|Reverse(pending)| pending.item);
                    },
                    other => other,
                }
            };

            match next_deadline {
                Some(deadline) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(deadline) => {},
                        () = &mut notified => {},
                    }
                },
                None => notified.await,
            }
        }
    }

    fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    fn close(&self) {
        {
            let mut inner = self.inner.lock();
            inner.closed = true;
            inner.heap.clear();
        }
        self.notify.notify_waiters();
    }
}
