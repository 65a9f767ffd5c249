use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    #[builder(default = Uuid::new_v4())]
    pub course_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    #[serde(default)]
    #[builder(default, setter(into))]
    pub description: String,

    #[serde(default = "chrono::offset::Utc::now")]
    #[builder(default = chrono::offset::Utc::now())]
    pub created_at: DateTime<Utc>,
}

/// A module of a course. `order` is unique within the course.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct Module {
    #[builder(default = Uuid::new_v4())]
    pub module_id: Uuid,

    pub course_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    pub order: u32,
}

/// A lesson of a module. `order` is unique within the module. The course ID is carried along so
/// that access checks do not need to resolve the module first.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct Lesson {
    #[builder(default = Uuid::new_v4())]
    pub lesson_id: Uuid,

    pub module_id: Uuid,

    pub course_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    pub order: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub video_url: Option<String>,
}
