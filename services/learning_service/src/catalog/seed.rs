use serde::Deserialize;
use uuid::Uuid;

use super::types::{Course, Lesson, Module};

/// Catalog document loaded into the in-memory store, as exported by the authoring tools.
///
/// ```json
/// { "Courses": [ { "CourseId": "…", "Title": "Rust", "Modules": [
///     { "ModuleId": "…", "Title": "Ownership", "Order": 1, "Lessons": [
///         { "LessonId": "…", "Title": "Moves", "Order": 1, "VideoUrl": "https://…" } ] } ] } ] }
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub courses: Vec<CourseSeed>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct CourseSeed {
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modules: Vec<ModuleSeed>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleSeed {
    pub module_id: Uuid,
    pub title: String,
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<LessonSeed>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct LessonSeed {
    pub lesson_id: Uuid,
    pub title: String,
    pub order: u32,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Seed flattened into the records the catalog stores.
#[derive(Debug, Default)]
pub struct CatalogRecords {
    pub courses: Vec<Course>,
    pub modules: Vec<Module>,
    pub lessons: Vec<Lesson>,
}

impl CatalogSeed {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn into_records(self) -> CatalogRecords {
        let mut records = CatalogRecords::default();
        for course in self.courses {
            for module in course.modules {
                for lesson in module.lessons {
                    records.lessons.push(Lesson {
                        lesson_id: lesson.lesson_id,
                        module_id: module.module_id,
                        course_id: course.course_id,
                        title: lesson.title,
                        order: lesson.order,
                        video_url: lesson.video_url,
                    });
                }
                records.modules.push(
                    Module::builder()
                        .module_id(module.module_id)
                        .course_id(course.course_id)
                        .title(module.title)
                        .order(module.order)
                        .build(),
                );
            }
            records.courses.push(
                Course::builder()
                    .course_id(course.course_id)
                    .title(course.title)
                    .description(course.description)
                    .build(),
            );
        }

        records
    }
}
