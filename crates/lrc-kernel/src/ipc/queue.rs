//! # Inbound Queue
//!
//! Multi-producer, single-consumer FIFO between the receive path and the
//! dispatch loop. Producers hold a clonable `InboundSender`; the dispatch loop
//! owns the `InboundQueue`.
//!
//! Messages are delivered in the order they were enqueued. Enqueue only fails
//! once the queue has been shut down.

use crate::error::QueueError;
use lrc_types::Message;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Producer side of the inbound queue.
#[derive(Clone, Debug)]
pub struct InboundSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl InboundSender {
    /// Append `message` to the queue.
    pub fn enqueue(&self, message: Message) -> Result<(), QueueError> {
        let kind = message.kind();
        self.tx.send(message).map_err(|_| QueueError::Closed)?;
        trace!(kind = %kind, "Message enqueued");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side, owned by the single dispatch loop.
#[derive(Debug)]
pub struct InboundQueue {
    rx: mpsc::UnboundedReceiver<Message>,
    sender: InboundSender,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx,
            sender: InboundSender { tx },
        }
    }

    /// A new producer handle.
    pub fn sender(&self) -> InboundSender {
        self.sender.clone()
    }

    /// Wait for the next message. `None` only after shutdown once empty.
    pub async fn next(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Next message if one is already queued.
    pub fn try_next(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Close the queue and discard whatever is still undelivered.
    ///
    /// Returns the number of discarded messages.
    pub fn shutdown(&mut self) -> usize {
        self.rx.close();
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            warn!(discarded, "Inbound queue shut down with undelivered messages");
        }
        discarded
    }
}
