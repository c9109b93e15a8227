use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::notifications::{NotificationCenter, NotificationSource};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic notification refresh.
///
/// Fetches once immediately, then on every tick until stopped. Each fetch
/// is spawned on its own, so a slow response may overlap the next tick.
pub struct NotificationPoller {
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl NotificationPoller {
    pub fn spawn<S: NotificationSource>(
        center: Arc<NotificationCenter<S>>,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = period.as_secs(), "notification polling started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        let center = Arc::clone(&center);
                        tokio::spawn(async move {
                            // failures are logged by the center
                            let _ = center.refresh().await;
                        });
                    }
                }
            }

            debug!("notification polling loop exited");
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the ticker and waits for the loop to exit. Fetches already in
    /// flight are left to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("notification polling stopped");
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::testing::{notification, FakeSource};

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_then_every_period() {
        let center = Arc::new(NotificationCenter::new(FakeSource::with(vec![
            notification(1, false),
        ])));
        let poller = NotificationPoller::spawn(Arc::clone(&center), DEFAULT_POLL_INTERVAL);

        settle().await;
        assert_eq!(center.source().fetch_count(), 1);
        assert_eq!(center.unread_count(), 1);

        tokio::time::sleep(Duration::from_secs(65)).await;
        settle().await;
        assert_eq!(center.source().fetch_count(), 3);

        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_ticker() {
        let center = Arc::new(NotificationCenter::new(FakeSource::default()));
        let poller = NotificationPoller::spawn(Arc::clone(&center), Duration::from_secs(30));
        settle().await;
        assert!(poller.is_running());

        poller.stop().await;
        let fetched = center.source().fetch_count();

        tokio::time::sleep(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(center.source().fetch_count(), fetched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failures_do_not_stop_polling() {
        let center = Arc::new(NotificationCenter::new(FakeSource::default()));
        center.source().set_failing(true);

        let poller = NotificationPoller::spawn(Arc::clone(&center), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(25)).await;
        settle().await;

        assert_eq!(center.source().fetch_count(), 3);
        assert!(poller.is_running());
        poller.stop().await;
    }
}
