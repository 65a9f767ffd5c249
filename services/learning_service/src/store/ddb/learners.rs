use async_trait::async_trait;
use aws_sdk_dynamodb::model::Select;
use common_macros::hash_map;
use service_core::ddb::query::QueryInput;
use uuid::Uuid;

use super::item::s;
use super::{partition, DdbStore, ThreadSafeDdbClient, PAGE_SIZE};
use crate::enrollment::{Enrollment, EnrollmentsRepository};
use crate::progress::{CompletionsRepository, LessonCompletion};
use crate::store::RepositoryError;

#[async_trait]
impl<T: ThreadSafeDdbClient> EnrollmentsRepository for DdbStore<T> {
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), RepositoryError> {
        self.put_unique(
            &self.tables.enrollments,
            enrollment,
            "attribute_not_exists(UserId) AND attribute_not_exists(CourseId)",
            "UserId, CourseId",
        )
        .await
    }

    async fn enrollment(&self, user_id: &Uuid, course_id: &Uuid) -> Result<Option<Enrollment>, RepositoryError> {
        let key = hash_map! {
            "UserId".to_owned() => s(user_id),
            "CourseId".to_owned() => s(course_id),
        };
        self.get(&self.tables.enrollments, key).await
    }

    async fn enrollments_for_user(&self, user_id: &Uuid) -> Result<Vec<Enrollment>, RepositoryError> {
        let mut enrollments: Vec<Enrollment> = self
            .query_records(partition(&self.tables.enrollments, "UserId", user_id.to_string()))
            .await?;
        enrollments.sort_by_key(|e| e.enrolled_at);

        Ok(enrollments)
    }

    async fn enrollments_for_course(&self, course_id: &Uuid) -> Result<Vec<Enrollment>, RepositoryError> {
        let input = QueryInput::builder()
            .table_name(self.tables.enrollments.as_str())
            .index_name("CourseIdIndex")
            .key_condition_expression("CourseId = :value")
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(hash_map! {
                ":value".to_owned() => s(course_id),
            })
            .limit(PAGE_SIZE)
            .build();

        let mut enrollments: Vec<Enrollment> = self.query_records(input).await?;
        enrollments.sort_by_key(|e| e.enrolled_at);

        Ok(enrollments)
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> CompletionsRepository for DdbStore<T> {
    async fn insert_completion(&self, completion: &LessonCompletion) -> Result<(), RepositoryError> {
        self.put_unique(
            &self.tables.completions,
            completion,
            "attribute_not_exists(UserId) AND attribute_not_exists(LessonId)",
            "UserId, LessonId",
        )
        .await
    }

    async fn completion(&self, user_id: &Uuid, lesson_id: &Uuid) -> Result<Option<LessonCompletion>, RepositoryError> {
        let key = hash_map! {
            "UserId".to_owned() => s(user_id),
            "LessonId".to_owned() => s(lesson_id),
        };
        self.get(&self.tables.completions, key).await
    }

    async fn completions_for_course(
        &self,
        user_id: &Uuid,
        course_id: &Uuid,
    ) -> Result<Vec<LessonCompletion>, RepositoryError> {
        let mut input = partition(&self.tables.completions, "UserId", user_id.to_string());
        input.filter_expression = Some("CourseId = :course".to_owned());
        if let Some(values) = input.expression_attribute_values.as_mut() {
            values.insert(":course".to_owned(), s(course_id));
        }

        self.query_records(input).await
    }
}
