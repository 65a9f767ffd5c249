use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::types::QuizAttempt;
use crate::progress::rounded_percent;

const TOP_LEARNERS: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LearnerScore {
    pub user_id: Uuid,
    pub average_score: f64,
    pub attempts: u32,
}

/// Attempt statistics over a set of quizzes.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct QuizStats {
    pub total_attempts: u32,
    pub passed: u32,
    pub failed: u32,
    /// `passed / total_attempts * 100` rounded half up, 0 without attempts.
    pub pass_percentage: u32,
    /// At most five learners by descending average score. Equal averages are ordered by user ID.
    pub top_learners: Vec<LearnerScore>,
}

impl QuizStats {
    pub fn from_attempts<'a>(attempts: impl IntoIterator<Item = &'a QuizAttempt>) -> Self {
        let mut stats = QuizStats::default();
        let mut per_learner: HashMap<Uuid, (u64, u32)> = HashMap::new();

        for attempt in attempts {
            stats.total_attempts += 1;
            if attempt.passed {
                stats.passed += 1;
            }

            let entry = per_learner.entry(attempt.user_id).or_default();
            entry.0 += u64::from(attempt.score);
            entry.1 += 1;
        }
        stats.failed = stats.total_attempts - stats.passed;
        stats.pass_percentage = rounded_percent(stats.passed, stats.total_attempts);

        let mut learners: Vec<LearnerScore> = per_learner
            .into_iter()
            .map(|(user_id, (sum, attempts))| LearnerScore {
                user_id,
                average_score: sum as f64 / f64::from(attempts),
                attempts,
            })
            .collect();
        learners.sort_by(|a, b| {
            b.average_score
                .partial_cmp(&a.average_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        learners.truncate(TOP_LEARNERS);
        stats.top_learners = learners;

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(user_id: Uuid, score: u32, passed: bool) -> QuizAttempt {
        QuizAttempt::builder()
            .user_id(user_id)
            .quiz_id(Uuid::nil())
            .score(score)
            .total_questions(5)
            .passed(passed)
            .build()
    }

    #[test]
    fn no_attempts_is_all_zero() {
        let stats = QuizStats::from_attempts(&[]);

        assert_eq!(QuizStats::default(), stats);
        assert_eq!(0, stats.pass_percentage);
    }

    #[test]
    fn counts_and_rounds_pass_percentage() {
        let user = Uuid::new_v4();
        let attempts = vec![
            attempt(user, 4, true),
            attempt(user, 1, false),
            attempt(Uuid::new_v4(), 5, true),
        ];

        let stats = QuizStats::from_attempts(&attempts);

        assert_eq!(3, stats.total_attempts);
        assert_eq!(2, stats.passed);
        assert_eq!(1, stats.failed);
        assert_eq!(67, stats.pass_percentage);
    }

    #[test]
    fn ranks_learners_by_average_score() {
        let ids: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let mut attempts: Vec<QuizAttempt> = ids[..6]
            .iter()
            .enumerate()
            .map(|(i, id)| attempt(*id, i as u32, i >= 3))
            .collect();
        attempts.push(attempt(ids[6], 2, false));
        attempts.push(attempt(ids[6], 4, true));

        let stats = QuizStats::from_attempts(&attempts);

        assert_eq!(5, stats.top_learners.len());
        assert_eq!(ids[5], stats.top_learners[0].user_id);
        assert_eq!(5.0, stats.top_learners[0].average_score);
        assert_eq!(ids[4], stats.top_learners[1].user_id);
        let tied: Vec<&LearnerScore> = stats.top_learners.iter().filter(|l| l.average_score == 3.0).collect();
        assert_eq!(2, tied.len());
        assert!(tied[0].user_id < tied[1].user_id);
        assert_eq!(2, stats.top_learners.iter().find(|l| l.user_id == ids[6]).unwrap().attempts);
    }
}
