use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::CatalogClient;
use crate::store::CatalogStore;

/// Background refresh of a [`CatalogStore`]. The first tick fires immediately.
/// Dropping the poller cancels it.
pub struct CatalogPoller {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CatalogPoller {
    pub fn spawn(client: CatalogClient, store: Arc<CatalogStore>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        store.refresh(&client).await;
                    }
                }
            }
            info!(event_name = "client.poller.stopped", correlation_id = "catalog", "catalog poller stopped");
        });

        info!(
            event_name = "client.poller.started",
            correlation_id = "catalog",
            period_ms = period.as_millis() as u64,
            "catalog poller started"
        );
        Self { token, handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the timer and waits for an in-flight refresh to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for CatalogPoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
