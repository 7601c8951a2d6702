use std::sync::Arc;

use coursehub::cache::MemoryCache;
use coursehub::models::{Actor, NewCourseRequest, SubmissionStatus};
use coursehub::policy::Role;
use coursehub::store::MemoryStore;
use coursehub::{AppError, Engine};

fn engine() -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    (Engine::new(store.clone(), cache), store)
}

fn admin() -> Actor {
    Actor::new("a1", Role::Admin, "admin@example.com")
}

fn teacher() -> Actor {
    Actor::new("t1", Role::Teacher, "t1@example.com").with_name("Dr. Hart")
}

fn student() -> Actor {
    Actor::new("u1", Role::Student, "u1@example.com").with_name("Ada")
}

fn cs101() -> NewCourseRequest {
    NewCourseRequest {
        title: "CS101".into(),
        code: "CS101".into(),
        description: "Introduction to Computer Science".into(),
        category: "Computer Science".into(),
        price: 15000,
        thumbnail: String::new(),
        duration: "12 weeks".into(),
        status: Default::default(),
        start_date: None,
        end_date: None,
    }
}

/// The full enroll -> publish -> submit -> grade path, including the
/// duplicate-submit conflict.
#[tokio::test]
async fn enroll_submit_grade_scenario() {
    let (engine, _store) = engine();

    let course = engine
        .courses
        .create(&teacher(), cs101())
        .await
        .expect("create course");

    let enrollment = engine
        .enrollments
        .enroll(&student(), &course)
        .await
        .expect("enroll");
    assert_eq!(enrollment.course.price, 15000);

    let work = engine
        .works
        .publish(
            &teacher(),
            &course,
            "Essay 1",
            "Write about algorithms",
            "2099-01-10T00:00:00Z",
        )
        .await
        .expect("publish");

    let outcome = engine
        .submissions
        .submit(&student(), &work, "my answer", "")
        .await
        .expect("submit");
    assert_eq!(outcome.submission.status, SubmissionStatus::Submitted);
    assert!(!outcome.late);

    let graded = engine
        .submissions
        .grade(&teacher(), &outcome.submission.id, "A", "Great work")
        .await
        .expect("grade");
    assert_eq!(graded.status, SubmissionStatus::Graded);
    assert_eq!(graded.grade.as_deref(), Some("A"));
    assert_eq!(graded.feedback.as_deref(), Some("Great work"));

    let err = engine
        .submissions
        .submit(&student(), &work, "again", "")
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AppError::Conflict(_)));

    let mine = engine
        .submissions
        .list_by_student("u1")
        .await
        .expect("list");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].grade.as_deref(), Some("A"));
}

/// The authorization matrix cases from the role policy, driven through the
/// services rather than the pure function.
#[tokio::test]
async fn authorization_matrix() {
    let (engine, _store) = engine();

    let err = engine
        .courses
        .create(&student(), cs101())
        .await
        .expect_err("student create course");
    assert!(matches!(err, AppError::Authorization(_)));

    let course = engine
        .courses
        .create(&admin(), cs101())
        .await
        .expect("admin create course");

    let err = engine
        .enrollments
        .enroll(&admin(), &course)
        .await
        .expect_err("admin enroll");
    assert!(matches!(err, AppError::Authorization(_)));
}

/// Anonymous callers can browse the catalog but nothing else writes.
#[tokio::test]
async fn anonymous_browsing() {
    let (engine, _store) = engine();
    engine
        .courses
        .create(&admin(), cs101())
        .await
        .expect("create course");

    let listed = engine.courses.list().await.expect("list");
    assert_eq!(listed.len(), 1);
    let found = engine.courses.search("computer").await.expect("search");
    assert_eq!(found.len(), 1);
}

/// Favourites survive a restart via the local cache alone; the remote
/// mirror is only written for signed-in users.
#[tokio::test]
async fn favourites_round_trip_across_sessions() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());

    let course = {
        let engine = Engine::new(store.clone(), cache.clone());
        let course = engine
            .courses
            .create(&admin(), cs101())
            .await
            .expect("create course");
        engine
            .favourites
            .toggle(Some(&student()), &course)
            .await
            .expect("toggle");
        course
    };

    let engine = Engine::new(store, cache);
    engine.favourites.load().await.expect("load");
    assert!(engine.favourites.is_favourite(&course.id));

    // Symmetry: toggling back empties the set again.
    engine
        .favourites
        .toggle(Some(&student()), &course)
        .await
        .expect("toggle");
    assert!(engine.favourites.current().is_empty());
}
