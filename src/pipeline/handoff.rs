//! Queue between the producing and consuming stages of a pipeline

use thiserror::Error;
use tokio::sync::mpsc;

/// The consuming side of the queue has gone away
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("hand-off queue closed")]
pub struct QueueClosed;

enum Tx<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

enum Rx<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

/// Producer half; cloneable so several producers can feed one consumer
pub struct HandOffSender<T> {
    tx: Tx<T>,
}

/// Consumer half
pub struct HandOffReceiver<T> {
    rx: Rx<T>,
}

/// Creates a FIFO hand-off queue
///
/// # Arguments
///
/// * `capacity` - `Some(n)` bounds the queue so a fast producer waits for the
///   consumer; `None` never blocks the producer
pub fn channel<T>(capacity: Option<usize>) -> (HandOffSender<T>, HandOffReceiver<T>) {
    match capacity {
        Some(n) => {
            let (tx, rx) = mpsc::channel(n.max(1));
            (
                HandOffSender { tx: Tx::Bounded(tx) },
                HandOffReceiver { rx: Rx::Bounded(rx) },
            )
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                HandOffSender {
                    tx: Tx::Unbounded(tx),
                },
                HandOffReceiver {
                    rx: Rx::Unbounded(rx),
                },
            )
        }
    }
}

impl<T> HandOffSender<T> {
    /// Enqueues an item, waiting for room if the queue is bounded and full
    pub async fn push(&self, item: T) -> Result<(), QueueClosed> {
        match &self.tx {
            Tx::Bounded(tx) => tx.send(item).await.map_err(|_| QueueClosed),
            Tx::Unbounded(tx) => tx.send(item).map_err(|_| QueueClosed),
        }
    }

    /// Bound of the queue, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        match &self.tx {
            Tx::Bounded(tx) => Some(tx.max_capacity()),
            Tx::Unbounded(_) => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.tx {
            Tx::Bounded(tx) => tx.is_closed(),
            Tx::Unbounded(tx) => tx.is_closed(),
        }
    }
}

impl<T> Clone for HandOffSender<T> {
    fn clone(&self) -> Self {
        let tx = match &self.tx {
            Tx::Bounded(tx) => Tx::Bounded(tx.clone()),
            Tx::Unbounded(tx) => Tx::Unbounded(tx.clone()),
        };
        Self { tx }
    }
}

impl<T> HandOffReceiver<T> {
    /// Next item in FIFO order; `None` once every sender is dropped and the queue is drained
    pub async fn recv(&mut self) -> Option<T> {
        match &mut self.rx {
            Rx::Bounded(rx) => rx.recv().await,
            Rx::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Stops accepting new items; already queued items can still be received
    pub fn close(&mut self) {
        match &mut self.rx {
            Rx::Bounded(rx) => rx.close(),
            Rx::Unbounded(rx) => rx.close(),
        }
    }
}
