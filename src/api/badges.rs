use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Points threshold for automatically awarded badges.
    #[serde(default)]
    pub points_required: Option<u32>,
    #[serde(default)]
    pub is_auto: bool,
}

impl Badge {
    /// Whether an automatic badge is unlocked by `total_points`.
    pub fn unlocked_by(&self, total_points: u32) -> bool {
        self.is_auto && self.points_required.is_some_and(|required| total_points >= required)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardedBadge {
    pub badge: Badge,
    #[serde(default)]
    pub awarded_at: Option<String>,
}

#[derive(Serialize)]
struct AwardRequest {
    student_id: i64,
}

impl ApiClient {
    pub async fn list_badges(&self) -> ClientResult<Vec<Badge>> {
        self.get_list("/api/badges/").await
    }

    pub async fn student_badges(&self, student_id: i64) -> ClientResult<Vec<AwardedBadge>> {
        self.get_list(&format!("/api/badges/students/{student_id}/"))
            .await
    }

    /// Teacher-awarded badge.
    pub async fn award_badge(&self, badge_id: i64, student_id: i64) -> ClientResult<AwardedBadge> {
        self.post(
            &format!("/api/badges/{badge_id}/award/"),
            &AwardRequest { student_id },
        )
        .await
    }
}

/// Automatic badges `total_points` unlocks that the student does not hold yet.
pub fn newly_unlocked<'a>(
    badges: &'a [Badge],
    held: &[AwardedBadge],
    total_points: u32,
) -> Vec<&'a Badge> {
    badges
        .iter()
        .filter(|b| b.unlocked_by(total_points))
        .filter(|b| !held.iter().any(|h| h.badge.id == b.id))
        .collect()
}
