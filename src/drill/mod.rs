//! Drill helpers: deterministic question ordering, scoring and empty
//! answer shapes.

pub mod answer;
pub mod models;
pub mod scoring;
pub mod shuffle;

pub use answer::{initialize_answer, is_answer_complete, Answer};
pub use models::{Question, QuestionType, VocabularyWord, WordGroup};
pub use scoring::{calculate_points, rank_leaderboard, LeaderboardEntry, RankedEntry, ScoreInput};
pub use shuffle::{group_questions_by_word, group_questions_with_vocabulary, shuffle_with_seed, SeededRandom};
