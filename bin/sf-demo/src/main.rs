//! SwitchFabric Demo Gateway
//!
//! Wires a gateway with an echo handler, attaches a client mailbox, sends a
//! round-trip request, then idles until Ctrl+C and shuts down cleanly.
//!
//! Configuration via environment variables:
//! - `SF_GATEWAY_NAME` (default `fabric`)
//! - `SF_POOL_WORKERS` (default 4)
//! - `SF_QUEUE_CAPACITY` (default 256)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sf_common::{Address, Message, Payload};
use sf_router::{
    mailbox_arc, Endpoint, EndpointRegistry, Gateway, PoolConfig, RequestHandler, RouterError,
};

/// Replies to each request's source with the request body.
struct EchoHandler;

#[async_trait]
impl RequestHandler for EchoHandler {
    async fn handle(
        &self,
        message: Message,
        registry: &EndpointRegistry,
    ) -> Result<(), RouterError> {
        let Payload::Request(body) = &message.payload else {
            return Ok(());
        };
        let reply = message.reply(Payload::Response(body.clone()));
        match registry.lookup(reply.destination.first()) {
            Some(endpoint) => endpoint.send(vec![reply]),
            None => debug!(destination = %reply.destination, "No endpoint for reply, dropping"),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting SwitchFabric Demo Gateway");

    let gateway_name =
        std::env::var("SF_GATEWAY_NAME").unwrap_or_else(|_| "fabric".to_string());
    let workers = std::env::var("SF_POOL_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4);
    let queue_capacity = std::env::var("SF_QUEUE_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(256);

    let gateway = Gateway::new(
        gateway_name.clone(),
        Arc::new(EchoHandler),
        PoolConfig {
            name: format!("{gateway_name}-pool"),
            workers,
            queue_capacity,
        },
    );

    // Client mailbox receiving the echo replies.
    let (client, mut inbox) = mailbox_arc("client");
    gateway
        .attach_outgoing(client)
        .map_err(|e| anyhow::anyhow!("attach failed: {e}"))?;

    // One demonstration round trip through the pool.
    let request = Message::new(
        Address::new(["client"])?,
        Address::new([gateway_name.as_str()])?,
        Payload::Request(json!({"op": "echo", "text": "hello, fabric"})),
    );
    gateway
        .incoming()
        .map_err(|e| anyhow::anyhow!("gateway closed: {e}"))?
        .send(vec![request]);

    if let Some(reply) = inbox.recv().await {
        info!(
            source = %reply.source,
            destination = %reply.destination,
            kind = reply.payload.kind(),
            "Echo reply received"
        );
    }

    info!(gateway = %gateway_name, "Gateway running. Press Ctrl+C to shutdown.");
    shutdown_signal().await;
    info!("Shutdown signal received...");

    gateway.close();
    gateway.join().await;

    info!("SwitchFabric Demo Gateway shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
