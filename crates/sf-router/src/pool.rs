//! WorkerPool - fixed set of worker tasks draining a bounded queue of boxed
//! futures.
//!
//! Submission is synchronous and non-blocking: callers get an immediate
//! rejection when the pool is shut down or the queue is full, never a wait.
//! Shutdown stops new submissions; tasks already queued are still drained.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::RouterError;

/// Unit of work: a boxed future a worker drives to completion.
pub type Task = BoxFuture<'static, ()>;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub name: String,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            workers: 4,
            queue_capacity: 256,
        }
    }
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub name: String,
    pub workers: usize,
    pub queue_capacity: usize,
    pub queue_depth: u32,
    pub active_workers: u32,
}

/// Bounded worker pool executing boxed futures.
pub struct WorkerPool {
    config: PoolConfig,

    /// Sender side of the task queue. Taken on shutdown so the channel
    /// closes once queued tasks are drained.
    tx: Mutex<Option<mpsc::Sender<Task>>>,

    running: AtomicBool,

    /// Tasks queued but not yet picked up (Arc for sharing with workers)
    queue_depth: Arc<AtomicU32>,

    /// Workers currently driving a task (Arc for sharing with workers)
    active_workers: Arc<AtomicU32>,

    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawn the worker tasks. Must be called from within a tokio runtime.
    pub fn new(config: PoolConfig) -> Self {
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);

        let (tx, rx) = mpsc::channel::<Task>(queue_capacity);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let queue_depth = Arc::new(AtomicU32::new(0));
        let active_workers = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let rx = rx.clone();
            let pool_name = config.name.clone();
            let queue_depth = queue_depth.clone();
            let active_workers = active_workers.clone();
            handles.push(tokio::spawn(async move {
                Self::run_worker(worker_id, pool_name, rx, queue_depth, active_workers).await;
            }));
        }

        info!(
            pool = %config.name,
            workers = workers,
            queue_capacity = queue_capacity,
            "Worker pool started"
        );

        Self {
            config,
            tx: Mutex::new(Some(tx)),
            running: AtomicBool::new(true),
            queue_depth,
            active_workers,
            workers: Mutex::new(handles),
        }
    }

    /// Queue a task without blocking.
    ///
    /// Fails with [`RouterError::PoolShutdown`] once [`shutdown`] has run and
    /// with [`RouterError::PoolAtCapacity`] when the queue is full. Either
    /// way the task is discarded.
    ///
    /// [`shutdown`]: WorkerPool::shutdown
    pub fn try_submit(&self, task: Task) -> Result<(), RouterError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(RouterError::PoolShutdown);
        }

        let tx = match self.tx.lock().as_ref() {
            Some(tx) => tx.clone(),
            None => return Err(RouterError::PoolShutdown),
        };

        self.queue_depth.fetch_add(1, Ordering::SeqCst);
        match tx.try_send(task) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                let queued = self.queue_depth.fetch_sub(1, Ordering::SeqCst) - 1;
                debug!(pool = %self.config.name, queued = queued, "Pool at capacity, rejecting");
                Err(RouterError::PoolAtCapacity { queued })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.queue_depth.fetch_sub(1, Ordering::SeqCst);
                Err(RouterError::PoolShutdown)
            }
        }
    }

    pub fn is_shutdown(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }

    /// Stop accepting submissions. Tasks already queued are still drained by
    /// the workers, which exit once the queue is empty.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!(pool = %self.config.name, "Shutting down worker pool");
            // Dropping the sender closes the queue after the drain.
            self.tx.lock().take();
        }
    }

    /// Await worker exit. Call after [`shutdown`](WorkerPool::shutdown).
    pub async fn join(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            let _ = handle.await;
        }
        info!(pool = %self.config.name, "Worker pool joined");
    }

    async fn run_worker(
        worker_id: usize,
        pool_name: String,
        rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Task>>>,
        queue_depth: Arc<AtomicU32>,
        active_workers: Arc<AtomicU32>,
    ) {
        debug!(worker_id = worker_id, pool = %pool_name, "Worker started");

        loop {
            // Hold the receiver lock only while waiting; release it before
            // running the task so other workers keep draining.
            let task = {
                let mut rx = rx.lock().await;
                rx.recv().await
            };

            let Some(task) = task else {
                break;
            };

            queue_depth.fetch_sub(1, Ordering::SeqCst);
            active_workers.fetch_add(1, Ordering::SeqCst);
            task.await;
            active_workers.fetch_sub(1, Ordering::SeqCst);
        }

        debug!(worker_id = worker_id, pool = %pool_name, "Worker exited");
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn queue_depth(&self) -> u32 {
        self.queue_depth.load(Ordering::SeqCst)
    }

    pub fn active_workers(&self) -> u32 {
        self.active_workers.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            name: self.config.name.clone(),
            workers: self.config.workers.max(1),
            queue_capacity: self.config.queue_capacity.max(1),
            queue_depth: self.queue_depth(),
            active_workers: self.active_workers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn pool(workers: usize, queue_capacity: usize) -> WorkerPool {
        WorkerPool::new(PoolConfig {
            name: "test".to_string(),
            workers,
            queue_capacity,
        })
    }

    #[tokio::test]
    async fn test_submitted_task_runs() {
        let pool = pool(2, 16);
        let (tx, rx) = oneshot::channel();

        pool.try_submit(Box::pin(async move {
            let _ = tx.send(());
        }))
        .unwrap();

        rx.await.unwrap();
        pool.shutdown();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let pool = pool(1, 16);
        pool.shutdown();

        let result = pool.try_submit(Box::pin(async {}));
        assert_eq!(result, Err(RouterError::PoolShutdown));
        pool.join().await;
    }

    #[tokio::test]
    async fn test_queued_tasks_drain_after_shutdown() {
        let pool = pool(1, 16);
        let (tx, rx) = oneshot::channel();

        pool.try_submit(Box::pin(async move {
            let _ = tx.send(());
        }))
        .unwrap();
        pool.shutdown();
        pool.join().await;

        rx.await.unwrap();
    }

    #[tokio::test]
    async fn test_full_queue_rejects_with_at_capacity() {
        let pool = pool(1, 1);
        let (gate_tx, gate_rx) = oneshot::channel::<()>();

        // Occupy the single worker.
        pool.try_submit(Box::pin(async move {
            let _ = gate_rx.await;
        }))
        .unwrap();
        while pool.active_workers() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        // Fill the queue, then overflow it.
        pool.try_submit(Box::pin(async {})).unwrap();
        let overflow = pool.try_submit(Box::pin(async {}));
        assert!(matches!(
            overflow,
            Err(RouterError::PoolAtCapacity { queued: 1 })
        ));

        let _ = gate_tx.send(());
        pool.shutdown();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_stats_reflect_configuration() {
        let pool = pool(3, 8);
        let stats = pool.stats();
        assert_eq!(stats.name, "test");
        assert_eq!(stats.workers, 3);
        assert_eq!(stats.queue_capacity, 8);
        assert_eq!(stats.queue_depth, 0);
        pool.shutdown();
        pool.join().await;
    }
}
