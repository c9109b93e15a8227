//! Property-based tests for drill helpers
//!
//! - Seeded shuffle is deterministic and returns a permutation
//! - Grouping keeps every question exactly once
//! - Points stay within 0..=100 and incorrect answers score nothing

use proptest::prelude::*;

use classroom_drills::drill::scoring::MAX_POINTS;
use classroom_drills::drill::{
    calculate_points, group_questions_by_word, shuffle_with_seed, Question, QuestionType,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_question_type() -> impl Strategy<Value = QuestionType> {
    prop_oneof![
        Just(QuestionType::MultipleChoice),
        Just(QuestionType::FillInBlank),
        Just(QuestionType::DragAndDrop),
        Just(QuestionType::MemoryGame),
        Just(QuestionType::Picture),
    ]
}

fn arb_questions() -> impl Strategy<Value = Vec<Question>> {
    prop::collection::vec(
        (arb_question_type(), prop::sample::select(vec!["cat", "dog", "sun", "tree"])),
        0..24,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (question_type, word))| Question {
                id: i as i64,
                question_type,
                word: word.to_string(),
                word_id: None,
                text: None,
                pattern: None,
                answer: serde_json::Value::Null,
                choices: Vec::new(),
                drag_items: Vec::new(),
                memory_cards: Vec::new(),
                picture_word: Vec::new(),
            })
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_shuffle_is_deterministic(items in prop::collection::vec(any::<u16>(), 0..64), seed in any::<i64>()) {
        prop_assert_eq!(shuffle_with_seed(&items, seed), shuffle_with_seed(&items, seed));
    }

    #[test]
    fn prop_shuffle_is_permutation(items in prop::collection::vec(any::<u16>(), 0..64), seed in any::<i64>()) {
        let mut shuffled = shuffle_with_seed(&items, seed);
        let mut original = items.clone();
        shuffled.sort_unstable();
        original.sort_unstable();
        prop_assert_eq!(shuffled, original);
    }

    #[test]
    fn prop_groups_partition_questions(questions in arb_questions(), seed in -10_000i64..10_000) {
        let groups = group_questions_by_word(&questions, seed);

        let mut ids: Vec<i64> = groups
            .iter()
            .flat_map(|g| g.questions.iter().map(|q| q.id))
            .collect();
        ids.sort_unstable();
        let expected: Vec<i64> = (0..questions.len() as i64).collect();
        prop_assert_eq!(ids, expected);

        for group in &groups {
            prop_assert!(!group.questions.is_empty());
            prop_assert!(group.questions.iter().all(|q| q.word == group.word));
        }
    }

    #[test]
    fn prop_points_are_bounded(
        attempts in 0u32..50,
        time in 0.0f64..10_000.0,
        correct in any::<bool>(),
        kind in arb_question_type(),
    ) {
        let points = calculate_points(attempts, time, correct, &kind);
        prop_assert!(points <= MAX_POINTS);
        if !correct {
            prop_assert_eq!(points, 0);
        }
    }

    #[test]
    fn prop_more_time_never_scores_higher(
        attempts in 0u32..10,
        time in 0.0f64..1_000.0,
        extra in 0.0f64..1_000.0,
        kind in arb_question_type(),
    ) {
        let fast = calculate_points(attempts, time, true, &kind);
        let slow = calculate_points(attempts, time + extra, true, &kind);
        prop_assert!(slow <= fast);
    }
}
