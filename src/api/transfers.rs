use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
}

/// A request to move a student between two classrooms, decided by the
/// receiving teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub id: i64,
    pub student: i64,
    pub from_classroom: i64,
    pub to_classroom: i64,
    pub status: TransferStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TransferRequest {
    pub fn is_pending(&self) -> bool {
        self.status == TransferStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferInput {
    pub student: i64,
    pub from_classroom: i64,
    pub to_classroom: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiClient {
    pub async fn list_transfer_requests(&self) -> ClientResult<Vec<TransferRequest>> {
        self.get_list("/api/transfer-requests/").await
    }

    pub async fn create_transfer_request(
        &self,
        input: &TransferInput,
    ) -> ClientResult<TransferRequest> {
        self.post("/api/transfer-requests/", input).await
    }

    pub async fn approve_transfer_request(&self, request_id: i64) -> ClientResult<TransferRequest> {
        self.post(
            &format!("/api/transfer-requests/{request_id}/approve/"),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn reject_transfer_request(&self, request_id: i64) -> ClientResult<TransferRequest> {
        self.post(
            &format!("/api/transfer-requests/{request_id}/reject/"),
            &serde_json::json!({}),
        )
        .await
    }
}
