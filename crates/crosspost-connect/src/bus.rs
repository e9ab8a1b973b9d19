//! Completion message bus
//!
//! Cross-window traffic arrives here as [`InboundMessage`]s. Each
//! authorization attempt takes its own [`MessageSubscription`], owned and
//! torn down by the popup controller; there is no module-level listener.

use tokio::sync::broadcast;

use crosspost_core::message::InboundMessage;
use crosspost_core::prelude::*;

const DEFAULT_BUS_CAPACITY: usize = 32;

/// Fan-out channel for completion messages.
///
/// Producers (a browser bridge, the loopback redirect catcher, tests) call
/// [`MessageBus::publish`]; the controller subscribes per attempt.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<InboundMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a message to all live subscriptions.
    ///
    /// A message with no subscriber is dropped; traffic that arrives
    /// outside an authorization attempt has nowhere meaningful to go.
    pub fn publish(&self, message: InboundMessage) {
        let delivered = self.tx.send(message).unwrap_or(0);
        trace!(delivered, "published completion message");
    }

    /// Take a subscription scoped to one authorization attempt.
    pub fn subscribe(&self) -> MessageSubscription {
        MessageSubscription {
            rx: Some(self.tx.subscribe()),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// An owned, explicitly torn-down subscription to the message bus.
///
/// Receives only messages published after it was taken. Closing (or
/// dropping) it unregisters the listener; `close` is idempotent.
#[derive(Debug)]
pub struct MessageSubscription {
    rx: Option<broadcast::Receiver<InboundMessage>>,
}

impl MessageSubscription {
    /// Wait for the next message.
    ///
    /// Returns `None` once the subscription is closed or the bus is gone.
    /// A slow consumer that misses messages skips ahead rather than
    /// erroring; completion messages are self-contained.
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "message subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Unregister the listener. Safe to call more than once.
    pub fn close(&mut self) {
        self.rx = None;
    }
}
