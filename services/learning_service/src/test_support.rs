use service_core::auth::Role;
use uuid::Uuid;

use crate::catalog::{Course, Lesson, Module};
use crate::enrollment::EnrollmentGate;
use crate::request_context::RequestContext;
use crate::store::MemoryStore;

/// Course with module M1 (three lessons) and M2 (two lessons), plus a course without lessons.
pub struct CourseFixture {
    pub store: MemoryStore,
    pub course: Course,
    pub m1: Module,
    pub m2: Module,
    pub m1_lessons: Vec<Lesson>,
    pub m2_lessons: Vec<Lesson>,
    pub empty_course: Course,
}

impl CourseFixture {
    pub fn all_lessons(&self) -> Vec<Lesson> {
        self.m1_lessons.iter().chain(&self.m2_lessons).cloned().collect()
    }
}

fn lesson(module: &Module, order: u32) -> Lesson {
    Lesson::builder()
        .module_id(module.module_id)
        .course_id(module.course_id)
        .title(format!("{} lesson {}", module.title, order))
        .order(order)
        .build()
}

pub async fn course_fixture() -> CourseFixture {
    let store = MemoryStore::default();
    let course = Course::builder().title("Rust in practice").build();
    let empty_course = Course::builder().title("Coming soon").build();
    let m1 = Module::builder()
        .course_id(course.course_id)
        .title("Ownership")
        .order(1)
        .build();
    let m2 = Module::builder()
        .course_id(course.course_id)
        .title("Traits")
        .order(2)
        .build();
    let m1_lessons: Vec<Lesson> = (1..=3).map(|n| lesson(&m1, n)).collect();
    let m2_lessons: Vec<Lesson> = (1..=2).map(|n| lesson(&m2, n)).collect();

    store.insert_course(course.clone()).await.unwrap();
    store.insert_course(empty_course.clone()).await.unwrap();
    // Modules and lessons go in out of order; reads must sort them.
    store.insert_module(m2.clone()).await.unwrap();
    store.insert_module(m1.clone()).await.unwrap();
    for lesson in m1_lessons.iter().rev().chain(&m2_lessons) {
        store.insert_lesson(lesson.clone()).await.unwrap();
    }

    CourseFixture {
        store,
        course,
        m1,
        m2,
        m1_lessons,
        m2_lessons,
        empty_course,
    }
}

pub fn learner() -> RequestContext {
    RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), Role::Learner)
}

pub fn admin() -> RequestContext {
    RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), Role::Admin)
}

/// A new learner enrolled in the fixture's courses.
pub async fn enrolled_learner(fixture: &CourseFixture) -> RequestContext {
    let ctx = learner();
    let gate = EnrollmentGate::new(&fixture.store);
    gate.enroll(&ctx, &fixture.course.course_id).await.unwrap();
    gate.enroll(&ctx, &fixture.empty_course.course_id).await.unwrap();

    ctx
}
