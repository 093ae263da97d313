//! Counting concurrency limiter.
//!
//! Waiters are served in FIFO order: tokio's semaphore queues `acquire` calls
//! fairly, so a unit that starts waiting first is granted the next free slot.

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Bounds the number of in-flight units of work.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    max_concurrency: usize,
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    /// Creates a limiter admitting `max_concurrency` holders at once (minimum 1).
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            max_concurrency,
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Holders currently admitted.
    pub fn in_flight(&self) -> usize {
        self.max_concurrency - self.available()
    }

    /// Waits for a slot. The slot is released when the permit is dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }

    /// Runs `f` while holding a slot.
    pub async fn run<F, Fut, T>(&self, f: F) -> Result<T, AcquireError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _permit = self.acquire().await?;
        Ok(f().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permits_are_returned_on_drop() {
        let limiter = ConcurrencyLimiter::new(2);

        let first = limiter.acquire().await.unwrap();
        let _second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available(), 0);
        assert_eq!(limiter.in_flight(), 2);

        drop(first);
        assert_eq!(limiter.available(), 1);
    }

    #[test]
    fn test_zero_is_raised_to_one() {
        assert_eq!(ConcurrencyLimiter::new(0).max_concurrency(), 1);
    }
}
