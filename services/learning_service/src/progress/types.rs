use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// Marks a lesson as done by a user. At most one per (user, lesson), immutable once written.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct LessonCompletion {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub module_id: Uuid,
    pub course_id: Uuid,

    #[builder(default = true)]
    pub completed: bool,

    /// Seconds of video watched when the lesson was marked done. Informational only.
    #[builder(default)]
    pub watched_seconds: u32,

    #[builder(default = chrono::offset::Utc::now())]
    pub completed_at: DateTime<Utc>,
}

/// Completion of a course or module, recomputed from completion rows on every read.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Progress {
    pub completed_count: u32,
    pub total_count: u32,
    pub percent: u32,
    /// True only when there is at least one lesson and every lesson is done.
    pub complete: bool,
}

impl Progress {
    /// `percent` is `completed / total * 100` rounded half up. An empty scope is reported as 0%
    /// and never as complete.
    pub fn from_counts(completed: u32, total: u32) -> Self {
        if total == 0 {
            return Progress {
                completed_count: 0,
                total_count: 0,
                percent: 0,
                complete: false,
            };
        }

        let completed = completed.min(total);
        Progress {
            completed_count: completed,
            total_count: total,
            percent: rounded_percent(completed, total),
            complete: completed == total,
        }
    }
}

/// `part / whole * 100`, rounded half up. Zero when `whole` is zero.
pub fn rounded_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }

    let (p, w) = (u64::from(part), u64::from(whole));
    ((p * 200 + w) / (2 * w)) as u32
}
