//! Cached server notifications with a locally derived unread tally.
//!
//! Mutations (`mark_as_read`, `mark_all_as_read`, `delete_notification`)
//! touch the cache only after the remote call succeeds; on failure the
//! cache is left as it was. The unread count is recomputed from the cache
//! and can drift from the server between polls.

pub mod poller;

pub use poller::NotificationPoller;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::api::notifications::Notification;
use crate::error::ClientResult;

/// Remote side of the notification cache.
pub trait NotificationSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = ClientResult<Vec<Notification>>> + Send;

    fn mark_read(&self, notification_id: i64) -> impl Future<Output = ClientResult<()>> + Send;

    fn mark_all_read(&self) -> impl Future<Output = ClientResult<()>> + Send;

    fn remove(&self, notification_id: i64) -> impl Future<Output = ClientResult<()>> + Send;
}

#[derive(Debug, Default)]
struct Cache {
    notifications: Vec<Notification>,
    last_refreshed: Option<DateTime<Utc>>,
}

pub struct NotificationCenter<S> {
    source: S,
    cache: RwLock<Cache>,
    unread_tx: watch::Sender<usize>,
}

impl<S: NotificationSource> NotificationCenter<S> {
    pub fn new(source: S) -> Self {
        let (unread_tx, _) = watch::channel(0);
        Self {
            source,
            cache: RwLock::new(Cache::default()),
            unread_tx,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Replaces the cache with the server's current list. Returns the new
    /// unread count.
    pub async fn refresh(&self) -> ClientResult<usize> {
        match self.source.fetch().await {
            Ok(notifications) => {
                let unread = {
                    let mut cache = self.cache.write();
                    cache.notifications = notifications;
                    cache.last_refreshed = Some(Utc::now());
                    count_unread(&cache.notifications)
                };
                debug!(unread, "notifications refreshed");
                self.publish();
                Ok(unread)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch notifications");
                Err(e)
            }
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.cache.read().notifications.clone()
    }

    pub fn unread(&self) -> Vec<Notification> {
        self.cache
            .read()
            .notifications
            .iter()
            .filter(|n| !n.is_read)
            .cloned()
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        count_unread(&self.cache.read().notifications)
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.cache.read().last_refreshed
    }

    /// Receiver that observes every change of the unread count.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.unread_tx.subscribe()
    }

    pub async fn mark_as_read(&self, notification_id: i64) -> ClientResult<()> {
        if let Err(e) = self.source.mark_read(notification_id).await {
            error!(notification_id, error = %e, "failed to mark notification as read");
            return Err(e);
        }

        {
            let mut cache = self.cache.write();
            if let Some(n) = cache
                .notifications
                .iter_mut()
                .find(|n| n.id == notification_id)
            {
                n.is_read = true;
            }
        }
        self.publish();
        Ok(())
    }

    pub async fn mark_all_as_read(&self) -> ClientResult<()> {
        if let Err(e) = self.source.mark_all_read().await {
            error!(error = %e, "failed to mark all notifications as read");
            return Err(e);
        }

        {
            let mut cache = self.cache.write();
            for n in cache.notifications.iter_mut() {
                n.is_read = true;
            }
        }
        self.publish();
        Ok(())
    }

    pub async fn delete_notification(&self, notification_id: i64) -> ClientResult<()> {
        if let Err(e) = self.source.remove(notification_id).await {
            error!(notification_id, error = %e, "failed to delete notification");
            return Err(e);
        }

        self.cache
            .write()
            .notifications
            .retain(|n| n.id != notification_id);
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        let unread = self.unread_count();
        self.unread_tx.send_if_modified(|current| {
            if *current == unread {
                false
            } else {
                *current = unread;
                true
            }
        });
    }
}

fn count_unread(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::api::notifications::NotificationType;
    use crate::error::ClientError;

    pub fn notification(id: i64, is_read: bool) -> Notification {
        Notification {
            id,
            notification_type: NotificationType::General,
            title: format!("n{id}"),
            message: String::new(),
            is_read,
            created_at: None,
            related_drill: None,
            related_classroom: None,
            related_transfer: None,
        }
    }

    /// In-memory source that counts calls and can be told to fail.
    #[derive(Default)]
    pub struct FakeSource {
        pub server: Mutex<Vec<Notification>>,
        pub fetches: AtomicUsize,
        pub failing: AtomicBool,
    }

    impl FakeSource {
        pub fn with(notifications: Vec<Notification>) -> Self {
            Self {
                server: Mutex::new(notifications),
                ..Default::default()
            }
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn check(&self) -> ClientResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(ClientError::Http {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl NotificationSource for FakeSource {
        async fn fetch(&self) -> ClientResult<Vec<Notification>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.server.lock().clone())
        }

        async fn mark_read(&self, notification_id: i64) -> ClientResult<()> {
            self.check()?;
            for n in self.server.lock().iter_mut() {
                if n.id == notification_id {
                    n.is_read = true;
                }
            }
            Ok(())
        }

        async fn mark_all_read(&self) -> ClientResult<()> {
            self.check()?;
            for n in self.server.lock().iter_mut() {
                n.is_read = true;
            }
            Ok(())
        }

        async fn remove(&self, notification_id: i64) -> ClientResult<()> {
            self.check()?;
            self.server.lock().retain(|n| n.id != notification_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{notification, FakeSource};
    use super::*;

    fn center() -> NotificationCenter<FakeSource> {
        NotificationCenter::new(FakeSource::with(vec![
            notification(1, false),
            notification(2, true),
            notification(3, false),
        ]))
    }

    #[tokio::test]
    async fn test_refresh_replaces_cache() {
        let center = center();
        assert_eq!(center.unread_count(), 0);
        assert!(center.last_refreshed().is_none());

        let unread = center.refresh().await.unwrap();
        assert_eq!(unread, 2);
        assert_eq!(center.notifications().len(), 3);
        assert!(center.last_refreshed().is_some());
    }

    #[tokio::test]
    async fn test_mark_as_read_updates_after_success() {
        let center = center();
        center.refresh().await.unwrap();

        center.mark_as_read(1).await.unwrap();
        assert_eq!(center.unread_count(), 1);
        let ids: Vec<i64> = center.unread().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_state_unchanged() {
        let center = center();
        center.refresh().await.unwrap();
        center.source().set_failing(true);

        assert!(center.mark_as_read(1).await.is_err());
        assert!(center.mark_all_as_read().await.is_err());
        assert!(center.delete_notification(3).await.is_err());

        assert_eq!(center.unread_count(), 2);
        assert_eq!(center.notifications().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_cache() {
        let center = center();
        center.refresh().await.unwrap();
        center.source().set_failing(true);

        assert!(center.refresh().await.is_err());
        assert_eq!(center.notifications().len(), 3);
    }

    #[tokio::test]
    async fn test_mark_all_and_delete() {
        let center = center();
        center.refresh().await.unwrap();

        center.delete_notification(3).await.unwrap();
        assert_eq!(center.notifications().len(), 2);
        assert_eq!(center.unread_count(), 1);

        center.mark_all_as_read().await.unwrap();
        assert_eq!(center.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_sees_unread_changes() {
        let center = center();
        let mut rx = center.subscribe();

        center.refresh().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);

        center.mark_all_as_read().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 0);
    }
}
