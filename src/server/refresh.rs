//! Periodic overview refresh owned by a single consumer.
//!
//! Each WebSocket session (and the `watch` command) spawns its own
//! [`RefreshTask`]. Dropping or stopping the task cancels it, so nothing
//! keeps polling the spreadsheet after the consumer is gone.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::dashboard::{DashboardService, Overview};

/// Result of one refresh tick.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Refreshed(Overview),
    Failed(String),
}

pub struct RefreshTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Start refreshing immediately and then every `period`.
    ///
    /// The loop ends when cancelled or when the receiving side of `tx` is
    /// dropped. A failed refresh is reported and the loop keeps going; the
    /// next tick is the retry.
    pub fn spawn(
        service: Arc<DashboardService>,
        period: Duration,
        tx: mpsc::Sender<RefreshOutcome>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(service, period, tx, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel and wait for the loop to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "refresh task panicked");
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    service: Arc<DashboardService>,
    period: Duration,
    tx: mpsc::Sender<RefreshOutcome>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = service.overview() => result,
        };

        let outcome = match result {
            Ok(overview) => RefreshOutcome::Refreshed(overview),
            Err(e) => {
                tracing::warn!(error = %e, "overview refresh failed");
                RefreshOutcome::Failed(e.to_string())
            }
        };
        if tx.send(outcome).await.is_err() {
            break;
        }
    }
    tracing::debug!("refresh task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{ServiceConfig, demo_store};
    use crate::sheets::MemorySheetStore;
    use tokio::time::timeout;

    fn service_with(store: Arc<MemorySheetStore>) -> Arc<DashboardService> {
        Arc::new(DashboardService::new(store, ServiceConfig::default()))
    }

    fn demo() -> Arc<MemorySheetStore> {
        Arc::new(demo_store(&ServiceConfig::default()))
    }

    #[tokio::test]
    async fn test_first_refresh_is_immediate() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = RefreshTask::spawn(service_with(demo()), Duration::from_secs(3600), tx);

        let outcome = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        match outcome {
            Some(RefreshOutcome::Refreshed(overview)) => assert_eq!(overview.total_leads, 6),
            other => panic!("unexpected outcome: {:?}", other),
        }
        task.stop().await;
    }

    #[tokio::test]
    async fn test_refresh_repeats_and_stops_on_cancel() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = RefreshTask::spawn(service_with(demo()), Duration::from_millis(10), tx);

        for _ in 0..3 {
            let outcome = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
            assert!(matches!(outcome, Some(RefreshOutcome::Refreshed(_))));
        }

        task.stop().await;
        // Drain anything buffered; the channel must then close.
        let closed = timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_loop_continues() {
        let store = demo();
        store.set_unavailable(Some("offline"));
        let (tx, mut rx) = mpsc::channel(4);
        let task = RefreshTask::spawn(service_with(store.clone()), Duration::from_millis(10), tx);

        let outcome = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        match outcome {
            Some(RefreshOutcome::Failed(msg)) => assert!(msg.contains("offline")),
            other => panic!("unexpected outcome: {:?}", other),
        }

        store.set_unavailable(None);
        let recovered = timeout(Duration::from_secs(2), async {
            loop {
                if let Some(RefreshOutcome::Refreshed(_)) = rx.recv().await {
                    break;
                }
            }
        })
        .await;
        assert!(recovered.is_ok());
        task.stop().await;
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = RefreshTask::spawn(service_with(demo()), Duration::from_millis(10), tx);
        drop(task);

        let closed = timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
