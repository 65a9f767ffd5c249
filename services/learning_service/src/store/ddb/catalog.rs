use async_trait::async_trait;
use common_macros::hash_map;
use uuid::Uuid;

use super::item::s;
use super::{index_lookup, partition, DdbStore, ThreadSafeDdbClient};
use crate::catalog::{CatalogRepository, Course, Lesson, Module};
use crate::store::RepositoryError;

#[async_trait]
impl<T: ThreadSafeDdbClient> CatalogRepository for DdbStore<T> {
    async fn course(&self, course_id: &Uuid) -> Result<Option<Course>, RepositoryError> {
        let key = hash_map! {
            "CourseId".to_owned() => s(course_id),
        };
        self.get(&self.tables.courses, key).await
    }

    async fn module(&self, module_id: &Uuid) -> Result<Option<Module>, RepositoryError> {
        let input = index_lookup(&self.tables.modules, "ModuleIdIndex", "ModuleId", module_id.to_string());
        self.query_first(input).await
    }

    async fn lesson(&self, lesson_id: &Uuid) -> Result<Option<Lesson>, RepositoryError> {
        let input = index_lookup(&self.tables.lessons, "LessonIdIndex", "LessonId", lesson_id.to_string());
        self.query_first(input).await
    }

    async fn modules(&self, course_id: &Uuid) -> Result<Vec<Module>, RepositoryError> {
        self.query_records(partition(&self.tables.modules, "CourseId", course_id.to_string()))
            .await
    }

    async fn lessons(&self, module_id: &Uuid) -> Result<Vec<Lesson>, RepositoryError> {
        self.query_records(partition(&self.tables.lessons, "ModuleId", module_id.to_string()))
            .await
    }
}
