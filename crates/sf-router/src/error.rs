use thiserror::Error;

/// Errors surfaced by the routing layer.
///
/// Message-level routing never produces these: unroutable messages are
/// dropped, not failed. They cover the lifecycle and submission boundaries
/// where a caller can actually react.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("worker pool is shut down")]
    PoolShutdown,

    #[error("worker pool queue is full ({queued} queued)")]
    PoolAtCapacity { queued: u32 },

    #[error("handler failed: {0}")]
    Handler(String),
}
