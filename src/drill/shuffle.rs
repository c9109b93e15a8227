//! Deterministic question ordering.
//!
//! A drill's question order must be reproducible from a seed so that a
//! student resuming a run, or a teacher replaying it for review, sees the
//! same sequence. The generator is the classic `9301 / 49297 / 233280`
//! linear congruential generator; its constants are part of the stored
//! contract and must not change.

use std::collections::HashMap;

use crate::drill::models::{Question, VocabularyWord, WordGroup};

const LCG_MULTIPLIER: i64 = 9301;
const LCG_INCREMENT: i64 = 49297;
const LCG_MODULUS: i64 = 233280;

/// Seed offset between consecutive word groups.
pub const GROUP_SEED_STRIDE: i64 = 1000;

#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: i64,
}

impl SeededRandom {
    pub fn new(seed: i64) -> Self {
        // (s * a + c) mod m only depends on s mod m
        Self {
            state: seed.rem_euclid(LCG_MODULUS),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT).rem_euclid(LCG_MODULUS);
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Uniform index in `0..bound`; always 0 when `bound` is 0 or 1.
    pub fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let index = (self.next_f64() * bound as f64).floor() as usize;
        index.min(bound - 1)
    }
}

/// Fisher–Yates shuffle of a copy of `items`, walking from the back.
pub fn shuffle_with_seed<T: Clone>(items: &[T], seed: i64) -> Vec<T> {
    let mut shuffled = items.to_vec();
    let mut rng = SeededRandom::new(seed);

    for i in (1..shuffled.len()).rev() {
        let j = rng.next_index(i + 1);
        shuffled.swap(i, j);
    }

    shuffled
}

/// Groups questions by word (first appearance order) and shuffles each
/// group with `seed + index * GROUP_SEED_STRIDE`.
pub fn group_questions_by_word(questions: &[Question], seed: i64) -> Vec<WordGroup> {
    group_questions_with_vocabulary(questions, &[], seed)
}

/// Same as [`group_questions_by_word`], filling group metadata from the
/// drill's vocabulary list (matched by id, then by word).
pub fn group_questions_with_vocabulary(
    questions: &[Question],
    vocabulary: &[VocabularyWord],
    seed: i64,
) -> Vec<WordGroup> {
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<WordGroup> = Vec::new();

    for question in questions {
        let key = question.word_key();
        let slot = *index_by_key.entry(key).or_insert_with(|| {
            groups.push(WordGroup::for_question(question));
            groups.len() - 1
        });
        groups[slot].questions.push(question.clone());
    }

    for (index, group) in groups.iter_mut().enumerate() {
        let group_seed = seed.wrapping_add((index as i64).wrapping_mul(GROUP_SEED_STRIDE));
        group.questions = shuffle_with_seed(&group.questions, group_seed);

        let vocab = vocabulary
            .iter()
            .find(|v| group.word_id.is_some() && v.id == group.word_id)
            .or_else(|| vocabulary.iter().find(|v| v.word == group.word));
        if let Some(vocab) = vocab {
            group.apply_vocabulary(vocab);
        }
    }

    groups
}
