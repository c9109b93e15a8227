use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::ApiClient;
use crate::drill::answer::Answer;
use crate::drill::models::{Question, VocabularyWord, WordGroup};
use crate::drill::scoring::{calculate_points, rank_leaderboard, LeaderboardEntry, RankedEntry};
use crate::drill::shuffle::group_questions_with_vocabulary;
use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classroom: Option<i64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub question_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classroom: Option<i64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub vocabulary_words: Vec<VocabularyWord>,
}

impl Drill {
    /// Questions grouped by word in the order a student sees them for `seed`.
    pub fn word_groups(&self, seed: i64) -> Vec<WordGroup> {
        group_questions_with_vocabulary(&self.questions, &self.vocabulary_words, seed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DrillInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub classroom: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vocabulary_words: Vec<VocabularyWord>,
}

/// One answered question inside a run submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSubmission {
    pub question_id: i64,
    pub answer: Answer,
    pub attempts: u32,
    pub time_spent: f64,
    pub is_correct: bool,
    pub points: u32,
}

impl QuestionSubmission {
    /// `attempts` counts wrong tries before the final answer.
    pub fn new(
        question: &Question,
        answer: Answer,
        attempts: u32,
        time_spent: f64,
        is_correct: bool,
    ) -> Self {
        Self {
            question_id: question.id,
            answer,
            attempts,
            time_spent,
            is_correct,
            points: calculate_points(attempts, time_spent, is_correct, &question.question_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillSubmission {
    pub run_number: u32,
    pub seed: i64,
    pub points: u32,
    pub question_results: Vec<QuestionSubmission>,
}

impl DrillSubmission {
    pub fn new(run_number: u32, seed: i64, question_results: Vec<QuestionSubmission>) -> Self {
        let points = question_results.iter().map(|q| q.points).sum();
        Self {
            run_number,
            seed,
            points,
            question_results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillResult {
    pub id: i64,
    pub student: i64,
    #[serde(default)]
    pub student_name: Option<String>,
    pub run_number: u32,
    pub points: u32,
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default)]
    pub completion_time: Option<String>,
}

/// Best run per student, ranked. Ties on points go to the faster run.
pub fn leaderboard_from_results(results: &[DrillResult]) -> Vec<RankedEntry> {
    let mut best: HashMap<i64, &DrillResult> = HashMap::new();
    for result in results {
        best.entry(result.student)
            .and_modify(|current| {
                let better = result.points > current.points
                    || (result.points == current.points && result.time_spent < current.time_spent);
                if better {
                    *current = result;
                }
            })
            .or_insert(result);
    }

    let entries = best
        .into_values()
        .map(|r| LeaderboardEntry {
            student_id: r.student,
            name: r
                .student_name
                .clone()
                .unwrap_or_else(|| format!("student {}", r.student)),
            points: r.points,
            time_spent: r.time_spent,
        })
        .collect();

    rank_leaderboard(entries)
}

/// Next run number for a student given their previous results.
pub fn next_run_number(results: &[DrillResult], student_id: i64) -> u32 {
    results
        .iter()
        .filter(|r| r.student == student_id)
        .map(|r| r.run_number)
        .max()
        .map_or(1, |n| n + 1)
}

impl ApiClient {
    pub async fn list_drills(&self, classroom_id: Option<i64>) -> ClientResult<Vec<DrillSummary>> {
        match classroom_id {
            Some(id) => self.get_list(&format!("/api/drills/?classroom={id}")).await,
            None => self.get_list("/api/drills/").await,
        }
    }

    pub async fn get_drill(&self, drill_id: i64) -> ClientResult<Drill> {
        self.get(&format!("/api/drills/{drill_id}/")).await
    }

    pub async fn create_drill(&self, input: &DrillInput) -> ClientResult<Drill> {
        self.post("/api/drills/", input).await
    }

    pub async fn update_drill(&self, drill_id: i64, input: &DrillInput) -> ClientResult<Drill> {
        self.put(&format!("/api/drills/{drill_id}/"), input).await
    }

    pub async fn delete_drill(&self, drill_id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/drills/{drill_id}/")).await
    }

    pub async fn drill_results(&self, drill_id: i64) -> ClientResult<Vec<DrillResult>> {
        self.get_list(&format!("/api/drills/{drill_id}/results/"))
            .await
    }

    pub async fn submit_drill_result(
        &self,
        drill_id: i64,
        submission: &DrillSubmission,
    ) -> ClientResult<DrillResult> {
        tracing::info!(
            drill_id,
            run_number = submission.run_number,
            points = submission.points,
            "submitting drill run"
        );
        self.post(&format!("/api/drills/{drill_id}/results/"), submission)
            .await
    }

    pub async fn drill_leaderboard(&self, drill_id: i64) -> ClientResult<Vec<RankedEntry>> {
        let results = self.drill_results(drill_id).await?;
        Ok(leaderboard_from_results(&results))
    }
}
