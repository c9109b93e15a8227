use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::drill::scoring::{rank_leaderboard, LeaderboardEntry, RankedEntry};
use crate::error::ClientResult;
use crate::preferences::ClassroomKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub teacher: Option<i64>,
    #[serde(default)]
    pub student_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ClassroomKey for Classroom {
    fn classroom_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassroomInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Serialize)]
struct AddStudent<'a> {
    username: &'a str,
}

impl ApiClient {
    pub async fn list_classrooms(&self) -> ClientResult<Vec<Classroom>> {
        self.get_list("/api/classrooms/").await
    }

    pub async fn get_classroom(&self, classroom_id: i64) -> ClientResult<Classroom> {
        self.get(&format!("/api/classrooms/{classroom_id}/")).await
    }

    pub async fn create_classroom(&self, input: &ClassroomInput) -> ClientResult<Classroom> {
        self.post("/api/classrooms/", input).await
    }

    pub async fn update_classroom(
        &self,
        classroom_id: i64,
        input: &ClassroomInput,
    ) -> ClientResult<Classroom> {
        self.patch(&format!("/api/classrooms/{classroom_id}/"), input)
            .await
    }

    pub async fn delete_classroom(&self, classroom_id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/classrooms/{classroom_id}/")).await
    }

    pub async fn classroom_students(&self, classroom_id: i64) -> ClientResult<Vec<Student>> {
        self.get_list(&format!("/api/classrooms/{classroom_id}/students/"))
            .await
    }

    pub async fn add_student(&self, classroom_id: i64, username: &str) -> ClientResult<Student> {
        self.post(
            &format!("/api/classrooms/{classroom_id}/students/"),
            &AddStudent { username },
        )
        .await
    }

    pub async fn remove_student(&self, classroom_id: i64, student_id: i64) -> ClientResult<()> {
        self.delete(&format!(
            "/api/classrooms/{classroom_id}/students/{student_id}/"
        ))
        .await
    }

    /// Classroom leaderboard, ranked locally from the points endpoint.
    pub async fn classroom_leaderboard(&self, classroom_id: i64) -> ClientResult<Vec<RankedEntry>> {
        let entries: Vec<LeaderboardEntry> = self
            .get_list(&format!("/api/classrooms/{classroom_id}/points/"))
            .await?;
        Ok(rank_leaderboard(entries))
    }
}
