//! Single-slot "latest value" channel.
//!
//! The producer never blocks: publishing over an unread value evicts it.
//! Consumers only ever see the most recent value.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::time::Duration;

/// Creates a connected latest-value sender/receiver pair.
pub fn latest<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (
        LatestSender {
            tx,
            evict: rx.clone(),
        },
        LatestReceiver { rx },
    )
}

#[derive(Debug)]
pub struct LatestSender<T> {
    tx: Sender<T>,
    evict: Receiver<T>,
}

impl<T> Clone for LatestSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            evict: self.evict.clone(),
        }
    }
}

impl<T> LatestSender<T> {
    /// Publishes `value`, replacing any value not yet taken.
    pub fn publish(&self, value: T) {
        match self.tx.try_send(value) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(value)) => {
                let _ = self.evict.try_recv();
                // A concurrent publisher may have refilled the slot; its
                // value is just as new, so losing this one is fine.
                let _ = self.tx.try_send(value);
            }
        }
    }
}

#[derive(Debug)]
pub struct LatestReceiver<T> {
    rx: Receiver<T>,
}

impl<T> Clone for LatestReceiver<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone() }
    }
}

impl<T> LatestReceiver<T> {
    /// Takes the current value, if any.
    pub fn try_take(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for a value.
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// The underlying receiver, for use in `crossbeam_channel::select!`.
    pub fn as_receiver(&self) -> &Receiver<T> {
        &self.rx
    }
}
