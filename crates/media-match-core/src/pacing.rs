use async_trait::async_trait;
use std::time::Duration;

/// Waits between calls that trigger background work on the media server
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_pacer_sleeps() {
        let start = tokio::time::Instant::now();
        TokioPacer.pause(Duration::from_secs(15)).await;
        assert!(start.elapsed() >= Duration::from_secs(15));
    }
}
