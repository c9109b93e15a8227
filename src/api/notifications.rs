use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::notifications::NotificationSource;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TransferRequest,
    TransferApproved,
    TransferRejected,
    DrillAssigned,
    BadgeEarned,
    #[serde(other)]
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(alias = "type", default = "general")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub related_drill: Option<i64>,
    #[serde(default)]
    pub related_classroom: Option<i64>,
    #[serde(default)]
    pub related_transfer: Option<i64>,
}

fn general() -> NotificationType {
    NotificationType::General
}

impl ApiClient {
    pub async fn list_notifications(&self) -> ClientResult<Vec<Notification>> {
        self.get_list("/api/notifications/").await
    }

    pub async fn mark_notification_read(&self, notification_id: i64) -> ClientResult<()> {
        let _: serde_json::Value = self
            .post(
                &format!("/api/notifications/{notification_id}/mark-read/"),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        let _: serde_json::Value = self
            .post("/api/notifications/mark-all-read/", &serde_json::json!({}))
            .await?;
        Ok(())
    }

    pub async fn delete_notification(&self, notification_id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/notifications/{notification_id}/"))
            .await
    }
}

impl NotificationSource for ApiClient {
    async fn fetch(&self) -> ClientResult<Vec<Notification>> {
        self.list_notifications().await
    }

    async fn mark_read(&self, notification_id: i64) -> ClientResult<()> {
        self.mark_notification_read(notification_id).await
    }

    async fn mark_all_read(&self) -> ClientResult<()> {
        self.mark_all_notifications_read().await
    }

    async fn remove(&self, notification_id: i64) -> ClientResult<()> {
        self.delete_notification(notification_id).await
    }
}
