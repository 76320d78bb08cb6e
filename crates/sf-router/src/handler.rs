//! The handler seam and the unit of work the router submits per request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use sf_common::Message;

use crate::error::RouterError;
use crate::registry::EndpointRegistry;

/// Domain-side processing for accepted requests.
///
/// Implementations get the message and a live view of the endpoint registry
/// so they can send replies and onward messages. Errors are logged by the
/// surrounding task and never reach the router.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        message: Message,
        registry: &EndpointRegistry,
    ) -> Result<(), RouterError>;
}

/// One accepted request bundled with everything its handler needs.
pub struct RequestTask {
    message: Message,
    registry: Arc<EndpointRegistry>,
    handler: Arc<dyn RequestHandler>,
}

impl RequestTask {
    pub fn new(
        message: Message,
        registry: Arc<EndpointRegistry>,
        handler: Arc<dyn RequestHandler>,
    ) -> Self {
        Self {
            message,
            registry,
            handler,
        }
    }

    /// Invoke the handler. Handler failures are logged, not propagated.
    pub async fn run(self) {
        let destination = self.message.destination.clone();
        match self.handler.handle(self.message, &self.registry).await {
            Ok(()) => {
                debug!(destination = %destination, "Request handled");
            }
            Err(error) => {
                warn!(destination = %destination, error = %error, "Request handler failed");
            }
        }
    }
}
