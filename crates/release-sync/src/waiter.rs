use std::sync::Arc;
use std::time::Duration;

/// Suspends the caller between rate-limited requests.
///
/// Production code sleeps on the tokio timer; tests substitute a waiter that
/// records the requested delays and returns immediately.
#[async_trait::async_trait]
pub trait Waiter: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioWaiter;

#[async_trait::async_trait]
impl Waiter for TokioWaiter {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait::async_trait]
impl<T: Waiter + ?Sized> Waiter for Arc<T> {
    async fn wait(&self, duration: Duration) {
        (**self).wait(duration).await
    }
}
