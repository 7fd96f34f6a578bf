//! Test doubles shared by the unit tests

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::ports::{QueueError, QueueItem, TimeBoundedQueue};

/// FIFO queue that releases each item exactly at its minimum delay and
/// records the bounds it was given
#[derive(Debug)]
pub struct FakeQueue<T> {
    tx: Mutex<Option<mpsc::UnboundedSender<(Instant, QueueItem<T>)>>>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<(Instant, QueueItem<T>)>>,
    bounds: Mutex<Vec<(Duration, Duration)>>,
}

impl<T> FakeQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
            bounds: Mutex::new(Vec::new()),
        }
    }

    /// Bounds of every accepted item, in enqueue order
    pub fn bounds(&self) -> Vec<(Duration, Duration)> {
        self.bounds.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

#[async_trait]
impl<T: Send + 'static> TimeBoundedQueue<T> for FakeQueue<T> {
    fn enqueue(&self, item: QueueItem<T>) -> Result<(), QueueError> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(QueueError::Closed)?;
        self.bounds.lock().push((item.min_delay(), item.max_delay()));
        tx.send((Instant::now(), item)).map_err(|_| QueueError::Closed)
    }

    async fn dequeue(&self) -> Option<QueueItem<T>> {
        let (queued_at, item) = self.rx.lock().await.recv().await?;
        tokio::time::sleep_until(queued_at + item.min_delay()).await;
        Some(item)
    }

    fn len(&self) -> usize {
        // not tracked
        0
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}
