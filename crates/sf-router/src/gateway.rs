//! Gateway - owns one router, its worker pool, and the outgoing-endpoint
//! registry, and gates them behind a shared lifecycle.

use std::sync::Arc;

use tracing::info;

use crate::endpoint::Endpoint;
use crate::error::RouterError;
use crate::handler::RequestHandler;
use crate::pool::{PoolConfig, WorkerPool};
use crate::registry::EndpointRegistry;
use crate::router::RequestRouter;
use crate::Result;

/// One routing node: inbound router plus outgoing registry, closed as a unit.
///
/// After [`close`](Gateway::close) every accessor that could feed new work in
/// returns [`RouterError::PoolShutdown`].
pub struct Gateway {
    name: String,
    registry: Arc<EndpointRegistry>,
    pool: Arc<WorkerPool>,
    router: Arc<RequestRouter>,
}

impl Gateway {
    /// Build a gateway named `name`. Must be called from within a tokio
    /// runtime (the pool spawns its workers here).
    pub fn new(name: impl Into<String>, handler: Arc<dyn RequestHandler>, config: PoolConfig) -> Self {
        let name = name.into();
        let registry = Arc::new(EndpointRegistry::new());
        let pool = Arc::new(WorkerPool::new(config));
        let router = Arc::new(RequestRouter::new(
            name.clone(),
            registry.clone(),
            pool.clone(),
            handler,
        ));

        info!(gateway = %name, "Gateway created");

        Self {
            name,
            registry,
            pool,
            router,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_open(&self) -> Result<()> {
        if self.pool.is_shutdown() {
            return Err(RouterError::PoolShutdown);
        }
        Ok(())
    }

    /// The endpoint external transports feed inbound messages into.
    pub fn incoming(&self) -> Result<Arc<RequestRouter>> {
        self.ensure_open()?;
        Ok(self.router.clone())
    }

    /// Register an outgoing endpoint; returns the endpoint it displaced.
    pub fn attach_outgoing(&self, endpoint: Arc<dyn Endpoint>) -> Result<Option<Arc<dyn Endpoint>>> {
        self.ensure_open()?;
        Ok(self.registry.attach(endpoint))
    }

    /// Remove the outgoing endpoint registered under `prefix`.
    pub fn detach_outgoing(&self, prefix: &str) -> Result<Option<Arc<dyn Endpoint>>> {
        self.ensure_open()?;
        Ok(self.registry.detach(prefix))
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Stop the gateway: the pool rejects new work, queued tasks drain.
    /// Idempotent.
    pub fn close(&self) {
        info!(gateway = %self.name, "Closing gateway");
        self.pool.shutdown();
    }

    /// Await worker exit after [`close`](Gateway::close).
    pub async fn join(&self) {
        self.pool.join().await;
        info!(gateway = %self.name, "Gateway joined");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sf_common::Message;

    struct NoopHandler;

    #[async_trait]
    impl RequestHandler for NoopHandler {
        async fn handle(
            &self,
            _message: Message,
            _registry: &EndpointRegistry,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn gateway(name: &str) -> Gateway {
        Gateway::new(name, Arc::new(NoopHandler), PoolConfig::default())
    }

    #[tokio::test]
    async fn test_incoming_names_the_gateway() {
        let gateway = gateway("alpha");
        let incoming = gateway.incoming().unwrap();
        assert_eq!(incoming.name(), "alpha");
        gateway.close();
        gateway.join().await;
    }

    #[tokio::test]
    async fn test_accessors_fail_after_close() {
        let gateway = gateway("alpha");
        gateway.close();

        assert_eq!(gateway.incoming().err(), Some(RouterError::PoolShutdown));
        assert_eq!(
            gateway.detach_outgoing("anything").err(),
            Some(RouterError::PoolShutdown)
        );
        gateway.join().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let gateway = gateway("alpha");
        gateway.close();
        gateway.close();
        gateway.join().await;
    }
}
