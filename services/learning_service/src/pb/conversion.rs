use chrono::{DateTime, SecondsFormat, Utc};

use crate::analytics::CourseAnalytics;
use crate::certification::EligibilityReport;
use crate::enrollment::{Access as AccessModel, Enrollment as EnrollmentModel};
use crate::progress::{LessonCompletion as LessonCompletionModel, Progress};
use crate::quiz::{
    LearnerQuestion, LearnerScore as LearnerScoreModel, Question as QuestionModel, Quiz as QuizModel,
    QuizAttempt as QuizAttemptModel, QuizStats,
};

use super::check_access_output::Access as AccessPb;
use super::{
    Enrollment, GetCertificateEligibilityOutput, GetCourseAnalyticsOutput, GetProgressOutput, GetQuizStatsOutput,
    LearnerScore, LessonCompletion, Question, Quiz, QuizAttempt,
};

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<EnrollmentModel> for Enrollment {
    fn from(val: EnrollmentModel) -> Self {
        Enrollment {
            user_id: val.user_id.to_string(),
            course_id: val.course_id.to_string(),
            enrolled_at: timestamp(&val.enrolled_at),
        }
    }
}

impl From<AccessModel> for AccessPb {
    fn from(val: AccessModel) -> Self {
        match val {
            AccessModel::Locked => AccessPb::Locked,
            AccessModel::Unlocked => AccessPb::Unlocked,
        }
    }
}

impl From<LessonCompletionModel> for LessonCompletion {
    fn from(val: LessonCompletionModel) -> Self {
        LessonCompletion {
            user_id: val.user_id.to_string(),
            lesson_id: val.lesson_id.to_string(),
            completed: val.completed,
            watched_seconds: val.watched_seconds,
            completed_at: timestamp(&val.completed_at),
        }
    }
}

impl From<Progress> for GetProgressOutput {
    fn from(val: Progress) -> Self {
        GetProgressOutput {
            completed_count: val.completed_count,
            total_count: val.total_count,
            percent: val.percent,
            complete: val.complete,
        }
    }
}

impl From<QuizModel> for Quiz {
    fn from(val: QuizModel) -> Self {
        Quiz {
            quiz_id: val.quiz_id.to_string(),
            module_id: val.module_id.to_string(),
            course_id: val.course_id.to_string(),
            title: val.title,
            pass_marks: val.pass_marks,
            total_marks: val.total_marks,
        }
    }
}

/// Authoring view, with the correct option.
impl From<QuestionModel> for Question {
    fn from(val: QuestionModel) -> Self {
        Question {
            question_id: val.question_id.to_string(),
            quiz_id: val.quiz_id.to_string(),
            text: val.text,
            option_a: val.option_a,
            option_b: val.option_b,
            option_c: val.option_c,
            option_d: val.option_d,
            correct_option: val.correct_option.to_string(),
        }
    }
}

impl Question {
    /// Learner view: `correct_option` stays empty.
    pub fn for_learner(quiz_id: &uuid::Uuid, val: LearnerQuestion) -> Self {
        Question {
            question_id: val.question_id.to_string(),
            quiz_id: quiz_id.to_string(),
            text: val.text,
            option_a: val.option_a,
            option_b: val.option_b,
            option_c: val.option_c,
            option_d: val.option_d,
            correct_option: String::new(),
        }
    }
}

impl From<QuizAttemptModel> for QuizAttempt {
    fn from(val: QuizAttemptModel) -> Self {
        QuizAttempt {
            attempt_id: val.attempt_id.to_string(),
            user_id: val.user_id.to_string(),
            quiz_id: val.quiz_id.to_string(),
            answers: val.answers.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            score: val.score,
            passed: val.passed,
            attempted_at: timestamp(&val.attempted_at),
            total_questions: val.total_questions,
        }
    }
}

impl From<LearnerScoreModel> for LearnerScore {
    fn from(val: LearnerScoreModel) -> Self {
        LearnerScore {
            user_id: val.user_id.to_string(),
            average_score: val.average_score,
            attempts: val.attempts,
        }
    }
}

impl From<QuizStats> for GetQuizStatsOutput {
    fn from(val: QuizStats) -> Self {
        GetQuizStatsOutput {
            total_attempts: val.total_attempts,
            passed: val.passed,
            failed: val.failed,
            pass_percentage: val.pass_percentage,
            top_learners: val.top_learners.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CourseAnalytics> for GetCourseAnalyticsOutput {
    fn from(val: CourseAnalytics) -> Self {
        GetCourseAnalyticsOutput {
            enrollment_count: val.enrollment_count,
            module_count: val.module_count,
            quiz_count: val.quiz_count,
        }
    }
}

impl From<EligibilityReport> for GetCertificateEligibilityOutput {
    fn from(val: EligibilityReport) -> Self {
        GetCertificateEligibilityOutput {
            eligible: val.eligible,
            progress: Some(val.progress.into()),
            pending_quiz_ids: val.pending_quiz_ids.iter().map(ToString::to_string).collect(),
            failed_quiz_ids: val.failed_quiz_ids.iter().map(ToString::to_string).collect(),
        }
    }
}
