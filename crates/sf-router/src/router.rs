//! RequestRouter - decides per message whether this node is the destination
//! and hands accepted requests to the worker pool.

use std::sync::Arc;

use tracing::debug;

use sf_common::Message;

use crate::endpoint::Endpoint;
use crate::handler::{RequestHandler, RequestTask};
use crate::pool::WorkerPool;
use crate::registry::EndpointRegistry;

/// Routable destinations name the router itself or one child below it.
const MAX_ROUTABLE_SEGMENTS: usize = 2;

/// Inbound endpoint of a gateway.
///
/// Accepts a message iff its destination has at most two segments, the first
/// segment equals the router's name, and the payload is a request. Everything
/// else is dropped. Accepted messages become one pool task each,
/// fire-and-forget, in input order.
pub struct RequestRouter {
    name: String,
    registry: Arc<EndpointRegistry>,
    pool: Arc<WorkerPool>,
    handler: Arc<dyn RequestHandler>,
}

impl RequestRouter {
    pub fn new(
        name: impl Into<String>,
        registry: Arc<EndpointRegistry>,
        pool: Arc<WorkerPool>,
        handler: Arc<dyn RequestHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            registry,
            pool,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, message: &Message) -> bool {
        if message.destination.len() > MAX_ROUTABLE_SEGMENTS {
            debug!(
                router = %self.name,
                destination = %message.destination,
                "Dropping message, destination too deep"
            );
            return false;
        }
        if message.destination.first() != self.name {
            debug!(
                router = %self.name,
                destination = %message.destination,
                "Dropping message, destination names another node"
            );
            return false;
        }
        if !message.payload.is_request() {
            debug!(
                router = %self.name,
                destination = %message.destination,
                kind = message.payload.kind(),
                "Dropping message, payload is not a request"
            );
            return false;
        }
        true
    }
}

impl Endpoint for RequestRouter {
    fn prefix(&self) -> &str {
        &self.name
    }

    fn send(&self, messages: Vec<Message>) {
        // Shutdown is checked once per call. A transition mid-call does not
        // claw back tasks already submitted.
        if self.pool.is_shutdown() {
            debug!(
                router = %self.name,
                count = messages.len(),
                "Pool shut down, dropping batch"
            );
            return;
        }

        for message in messages {
            if !self.accepts(&message) {
                continue;
            }
            let task = RequestTask::new(message, self.registry.clone(), self.handler.clone());
            if let Err(error) = self.pool.try_submit(Box::pin(task.run())) {
                debug!(router = %self.name, error = %error, "Submission failed, dropping message");
            }
        }
    }
}
