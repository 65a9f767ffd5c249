use async_trait::async_trait;
use uuid::Uuid;

use super::types::{Course, Lesson, Module};
use crate::store::RepositoryError;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn course(&self, course_id: &Uuid) -> Result<Option<Course>, RepositoryError>;

    async fn module(&self, module_id: &Uuid) -> Result<Option<Module>, RepositoryError>;

    async fn lesson(&self, lesson_id: &Uuid) -> Result<Option<Lesson>, RepositoryError>;

    /// Modules of a course, by ascending `order`.
    async fn modules(&self, course_id: &Uuid) -> Result<Vec<Module>, RepositoryError>;

    /// Lessons of a module, by ascending `order`.
    async fn lessons(&self, module_id: &Uuid) -> Result<Vec<Lesson>, RepositoryError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct CourseOutline {
    pub course: Course,
    pub modules: Vec<ModuleOutline>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleOutline {
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

impl CourseOutline {
    pub fn lesson_ids(&self) -> impl Iterator<Item = &Uuid> {
        self.modules.iter().flat_map(|m| m.lessons.iter().map(|l| &l.lesson_id))
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

/// Resolves a course with all its modules and lessons, in order. `None` if the course does not
/// exist.
pub async fn course_outline(
    catalog: &impl CatalogRepository,
    course_id: &Uuid,
) -> Result<Option<CourseOutline>, RepositoryError> {
    let course = match catalog.course(course_id).await? {
        Some(course) => course,
        None => return Ok(None),
    };

    let modules = catalog.modules(course_id).await?;
    let mut outline = Vec::with_capacity(modules.len());
    for module in modules {
        let lessons = catalog.lessons(&module.module_id).await?;
        outline.push(ModuleOutline { module, lessons });
    }

    Ok(Some(CourseOutline {
        course,
        modules: outline,
    }))
}
