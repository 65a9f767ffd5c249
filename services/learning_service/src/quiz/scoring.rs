use std::collections::BTreeMap;

use uuid::Uuid;

use super::types::{OptionLabel, Question, Quiz};

/// Number of questions whose submitted label matches the correct option. Unanswered questions and
/// labels outside A-D count as wrong; answers to questions not in `questions` are ignored.
pub fn score(questions: &[Question], answers: &BTreeMap<Uuid, String>) -> u32 {
    questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.question_id)
                .and_then(|a| a.parse::<OptionLabel>().ok())
                .map_or(false, |label| label == q.correct_option)
        })
        .count() as u32
}

pub fn passed(quiz: &Quiz, score: u32) -> bool {
    score >= quiz.pass_marks
}
