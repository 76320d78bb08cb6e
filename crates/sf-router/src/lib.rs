//! SwitchFabric Message Router
//!
//! This crate provides the routing substrate of the fabric:
//! - RequestRouter: Inbound endpoint with address and payload-kind filtering
//! - WorkerPool: Bounded worker pool executing accepted requests
//! - EndpointRegistry: Live prefix map of outgoing endpoints
//! - RequestHandler: Seam for domain-side request processing
//! - Gateway: Lifecycle owner tying router, pool, and registry together
//! - Mailbox: Channel-backed endpoint for consumers and tests

pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod pool;
pub mod registry;
pub mod router;

pub use endpoint::{mailbox, mailbox_arc, Endpoint, Mailbox, MailboxEndpoint};
pub use error::RouterError;
pub use gateway::Gateway;
pub use handler::{RequestHandler, RequestTask};
pub use pool::{PoolConfig, PoolStats, Task, WorkerPool};
pub use registry::EndpointRegistry;
pub use router::RequestRouter;

pub type Result<T> = std::result::Result<T, RouterError>;
