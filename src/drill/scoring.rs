//! Per-question scoring and leaderboard ordering.
//!
//! The backend persists the authoritative score with the same formula;
//! `calculate_points` only drives what the client displays, so the two
//! must stay identical.

use serde::{Deserialize, Serialize};

use crate::drill::models::QuestionType;

pub const MAX_POINTS: u32 = 100;
pub const WRONG_ATTEMPT_PENALTY: u32 = 10;
pub const MAX_TIME_PENALTY: u32 = 30;

const DEFAULT_TIME_THRESHOLD_SECS: f64 = 15.0;
const MEMORY_GAME_TIME_THRESHOLD_SECS: f64 = 20.0;
const TIME_PENALTY_MULTIPLIER: u32 = 1;

/// Seconds of answering time that cost one point for this kind of question.
pub fn time_threshold_secs(question_type: &QuestionType) -> f64 {
    match question_type {
        QuestionType::MemoryGame => MEMORY_GAME_TIME_THRESHOLD_SECS,
        _ => DEFAULT_TIME_THRESHOLD_SECS,
    }
}

pub fn time_penalty(time_spent_secs: f64, question_type: &QuestionType) -> u32 {
    if time_spent_secs.is_nan() || time_spent_secs <= 0.0 {
        return 0;
    }
    if time_spent_secs.is_infinite() {
        return MAX_TIME_PENALTY;
    }
    let steps = (time_spent_secs / time_threshold_secs(question_type)).floor();
    let penalty = (steps.min(MAX_TIME_PENALTY as f64) as u32) * TIME_PENALTY_MULTIPLIER;
    penalty.min(MAX_TIME_PENALTY)
}

/// Points for one answered question, in `0..=100`.
pub fn calculate_points(
    wrong_attempts: u32,
    time_spent_secs: f64,
    is_correct: bool,
    question_type: &QuestionType,
) -> u32 {
    if !is_correct {
        return 0;
    }

    let attempt_penalty = wrong_attempts.saturating_mul(WRONG_ATTEMPT_PENALTY);
    MAX_POINTS
        .saturating_sub(attempt_penalty)
        .saturating_sub(time_penalty(time_spent_secs, question_type))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub attempts: u32,
    pub time_spent: f64,
    pub is_correct: bool,
    pub question_type: QuestionType,
}

impl ScoreInput {
    pub fn points(&self) -> u32 {
        calculate_points(
            self.attempts,
            self.time_spent,
            self.is_correct,
            &self.question_type,
        )
    }
}

pub fn total_points(inputs: &[ScoreInput]) -> u32 {
    inputs.iter().map(ScoreInput::points).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(alias = "student")]
    pub student_id: i64,
    #[serde(alias = "username", alias = "student_name")]
    pub name: String,
    #[serde(alias = "total_points")]
    pub points: u32,
    /// Total seconds spent on the run.
    #[serde(default)]
    pub time_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: u32,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
}

/// Sorts by points (desc), then time (asc), then name. Entries tied on
/// points and time share a rank; ranks are dense.
pub fn rank_leaderboard(mut entries: Vec<LeaderboardEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(a.time_spent.total_cmp(&b.time_spent))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut ranked = Vec::with_capacity(entries.len());
    let mut rank = 0;
    let mut previous: Option<(u32, f64)> = None;

    for entry in entries {
        let key = (entry.points, entry.time_spent);
        if previous != Some(key) {
            rank += 1;
            previous = Some(key);
        }
        ranked.push(RankedEntry { rank, entry });
    }

    ranked
}
