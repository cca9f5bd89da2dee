use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::errors::{LeafError, Result};

/// Bounded pool for the blocking preprocessing + inference work of one
/// request.
///
/// `slots` limits how many units run at once; `admission` additionally
/// bounds how many may wait for a slot. A request that finds admission
/// exhausted is rejected immediately with `ServiceBusy` instead of queueing
/// without bound.
pub struct InferencePool {
    slots: Arc<Semaphore>,
    admission: Arc<Semaphore>,
}

impl InferencePool {
    pub fn new(workers: usize, max_pending: usize) -> Self {
        let workers = workers.max(1);
        Self {
            slots: Arc::new(Semaphore::new(workers)),
            admission: Arc::new(Semaphore::new(workers + max_pending)),
        }
    }

    /// Runs `work` on the blocking thread pool and resolves when it
    /// completes. If the caller goes away first the unit still runs to
    /// completion and its result is dropped with the abandoned future.
    pub async fn dispatch<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let admission = self
            .admission
            .clone()
            .try_acquire_owned()
            .map_err(|_| LeafError::ServiceBusy)?;
        let slot = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| LeafError::Model {
                operation: "worker slot acquisition".to_string(),
                source: Box::new(e),
            })?;

        let handle = tokio::task::spawn_blocking(move || {
            let _admission = admission;
            let _slot = slot;
            work()
        });

        handle.await.map_err(|e| LeafError::Model {
            operation: "inference worker join".to_string(),
            source: Box::new(e),
        })?
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_dispatch_resolves_with_the_work_result() -> Result<()> {
        let pool = InferencePool::new(2, 4);
        let value = pool.dispatch(|| Ok(21 * 2)).await?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_propagates_work_errors() {
        let pool = InferencePool::new(1, 1);
        let result: Result<()> = pool
            .dispatch(|| {
                Err(LeafError::InvalidImage {
                    reason: "scripted".to_string(),
                })
            })
            .await;
        assert!(matches!(result, Err(LeafError::InvalidImage { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_saturated_pool_rejects_with_service_busy() {
        let pool = Arc::new(InferencePool::new(1, 0));
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let blocked = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                pool.dispatch(move || {
                    release_rx.recv().ok();
                    Ok(1)
                })
                .await
            })
        };

        // Let the first unit claim the only admission permit.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let rejected: Result<i32> = pool.dispatch(|| Ok(2)).await;
        assert!(matches!(rejected, Err(LeafError::ServiceBusy)));

        release_tx.send(()).unwrap();
        assert_eq!(blocked.await.unwrap().unwrap(), 1);

        // With the permit back, dispatch admits work again.
        let value = pool.dispatch(|| Ok(3)).await.unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_stay_independent() {
        let pool = Arc::new(InferencePool::new(4, 8));
        let mut handles = Vec::new();
        for i in 0..8_i64 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move { pool.dispatch(move || Ok(i * i)).await }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let i = i as i64;
            assert_eq!(handle.await.unwrap().unwrap(), i * i);
        }
    }
}
