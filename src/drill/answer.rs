use serde::{Deserialize, Serialize};

use crate::drill::models::{Question, QuestionType};

/// Sentinel for an unanswered multiple-choice question.
pub const UNANSWERED_CHOICE: i32 = -1;

/// In-progress answer for one question. Serialises to the same JSON shapes
/// the backend receives: `-1`, `[null, ...]`, `[]` or `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(i32),
    Blanks(Vec<Option<String>>),
    Text(String),
}

impl Answer {
    pub fn is_unanswered_choice(&self) -> bool {
        matches!(self, Self::Choice(UNANSWERED_CHOICE))
    }
}

/// Empty answer matching the question's type.
pub fn initialize_answer(question: &Question) -> Answer {
    match question.question_type {
        QuestionType::MultipleChoice => Answer::Choice(UNANSWERED_CHOICE),
        QuestionType::FillInBlank => Answer::Blanks(vec![None; question.blank_count()]),
        QuestionType::DragAndDrop => Answer::Blanks(vec![None; question.drag_items.len()]),
        QuestionType::MemoryGame => Answer::Blanks(Vec::new()),
        _ => Answer::Text(String::new()),
    }
}

/// Whether the student has filled every part of the answer.
///
/// Memory games are complete once every card has been matched.
pub fn is_answer_complete(question: &Question, answer: &Answer) -> bool {
    match (&question.question_type, answer) {
        (QuestionType::MultipleChoice, Answer::Choice(index)) => *index >= 0,
        (QuestionType::MemoryGame, Answer::Blanks(matched)) => {
            !question.memory_cards.is_empty()
                && matched.iter().flatten().count() >= question.memory_cards.len()
        }
        (QuestionType::FillInBlank | QuestionType::DragAndDrop, Answer::Blanks(slots)) => {
            !slots.is_empty()
                && slots
                    .iter()
                    .all(|slot| slot.as_deref().is_some_and(|s| !s.trim().is_empty()))
        }
        (QuestionType::Picture | QuestionType::Other(_), Answer::Text(text)) => {
            !text.trim().is_empty()
        }
        _ => false,
    }
}
