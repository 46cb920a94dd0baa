// Inbound message queue — the sole cross-thread boundary.
//
// A thin wrapper over `std::sync::mpsc`: network threads push decoded
// envelopes (multi-producer, one cloned `QueueSender` per thread), the
// consumer drains on its own schedule. `drain()` never blocks — the game
// loop calls it once per tick and gets whatever has arrived since.

use std::sync::mpsc::{self, Receiver, Sender};

use maple_grove_protocol::Envelope;

/// Producer handle, cloneable per network thread.
#[derive(Clone)]
pub struct QueueSender {
    tx: Sender<Envelope>,
}

impl QueueSender {
    /// Enqueue one envelope. Quietly drops it if the consumer side is gone
    /// (the network thread is about to shut down anyway).
    pub fn push(&self, envelope: Envelope) {
        let _ = self.tx.send(envelope);
    }
}

/// FIFO hand-off from network threads to the single consumer.
pub struct MessageQueue {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl MessageQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new producer handle for a network thread.
    pub fn sender(&self) -> QueueSender {
        QueueSender {
            tx: self.tx.clone(),
        }
    }

    /// Remove and return everything currently queued, oldest first.
    /// Non-blocking.
    pub fn drain(&self) -> Vec<Envelope> {
        let mut messages = Vec::new();
        while let Ok(envelope) = self.rx.try_recv() {
            messages.push(envelope);
        }
        messages
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}
