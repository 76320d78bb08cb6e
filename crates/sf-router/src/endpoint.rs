//! Addressable endpoints and the channel-backed mailbox implementation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use sf_common::Message;

/// An addressable destination that messages can be handed to.
///
/// `send` is fire-and-forget: it must not block, must not fail, and is free
/// to drop messages that fall outside the endpoint's scope. Callers get no
/// delivery guarantee beyond "the endpoint saw the batch".
pub trait Endpoint: Send + Sync {
    /// Leading address segment this endpoint answers for.
    fn prefix(&self) -> &str;

    /// Hand a batch of messages to the endpoint.
    fn send(&self, messages: Vec<Message>);
}

/// Create a mailbox endpoint: everything sent to it lands on an unbounded
/// channel that the paired [`Mailbox`] consumes.
pub fn mailbox(prefix: impl Into<String>) -> (MailboxEndpoint, Mailbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let endpoint = MailboxEndpoint {
        prefix: prefix.into(),
        tx,
    };
    (endpoint, Mailbox { rx })
}

/// Endpoint half of [`mailbox`]. Share it via `Arc` like any other endpoint.
pub struct MailboxEndpoint {
    prefix: String,
    tx: mpsc::UnboundedSender<Message>,
}

impl Endpoint for MailboxEndpoint {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn send(&self, messages: Vec<Message>) {
        for message in messages {
            if message.destination.first() != self.prefix {
                debug!(
                    prefix = %self.prefix,
                    destination = %message.destination,
                    "Mailbox received message outside its prefix"
                );
            }
            // Receiver dropped means nobody is listening; drop the message.
            let _ = self.tx.send(message);
        }
    }
}

/// Consumer half of [`mailbox`].
pub struct Mailbox {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Mailbox {
    /// Await the next message. `None` once all endpoint handles are dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Non-blocking poll for a message already delivered.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

/// Convenience for registries and tests that want an `Arc<dyn Endpoint>`.
pub fn mailbox_arc(prefix: impl Into<String>) -> (Arc<dyn Endpoint>, Mailbox) {
    let (endpoint, inbox) = mailbox(prefix);
    (Arc::new(endpoint), inbox)
}
