mod common;

use common::World;
use learnhub_core::models::{
    CreateCourseRequestRequest, RequestStatus, ResolveCourseRequestRequest,
};
use learnhub_core::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;

fn request(course_id: Uuid) -> CreateCourseRequestRequest {
    CreateCourseRequestRequest {
        course_id,
        payment_amount: Decimal::new(14998, 2),
    }
}

fn resolve(action: &str) -> ResolveCourseRequestRequest {
    ResolveCourseRequestRequest {
        action: action.to_string(),
        admin_notes: Some("  invoice settled ".to_string()),
    }
}

#[tokio::test]
async fn test_second_pending_request_conflicts() {
    let world = World::new().await;
    let (_, portal) = world.organization("acme").await;
    let course = world.course("Rust").await;

    world.services.requests.create(&portal, request(course.id)).await.unwrap();
    let err = world
        .services
        .requests
        .create(&portal, request(course.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let mine = world.services.requests.my_requests(&portal).await.unwrap();
    assert_eq!(mine.total, 1);
    assert_eq!(mine.pending, 1);
}

#[tokio::test]
async fn test_request_for_assigned_course_conflicts() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let course = world.course("Rust").await;
    world
        .services
        .availability
        .assign_course_to_organization(&world.admin, org, course.id)
        .await
        .unwrap();

    let err = world
        .services
        .requests
        .create(&portal, request(course.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_request_validation() {
    let world = World::new().await;
    let (_, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;

    let err = world
        .services
        .requests
        .create(
            &portal,
            CreateCourseRequestRequest {
                course_id: course.id,
                payment_amount: Decimal::new(-1, 0),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = world
        .services
        .requests
        .create(&portal, request(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = world
        .services
        .requests
        .create(&alice, request(course.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_approval_appends_course_without_employee_propagation() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;

    let created = world.services.requests.create(&portal, request(course.id)).await.unwrap();
    let approved = world
        .services
        .requests
        .resolve(&world.admin, created.id, resolve("approve"))
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.approved_by, Some(world.admin.user_id));
    assert!(approved.approved_at.is_some());
    assert_eq!(approved.admin_notes.as_deref(), Some("invoice settled"));

    assert!(world
        .repos
        .assignments
        .organization_course_ids(org)
        .await
        .unwrap()
        .contains(&course.id));
    assert!(world
        .repos
        .assignments
        .user_course_ids(alice.user_id)
        .await
        .unwrap()
        .is_empty());

    let err = world
        .services
        .requests
        .resolve(&world.admin, created.id, resolve("reject"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_rejection_leaves_organization_untouched() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let course = world.course("Rust").await;

    let created = world.services.requests.create(&portal, request(course.id)).await.unwrap();
    let rejected = world
        .services
        .requests
        .resolve(&world.admin, created.id, resolve("reject"))
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert!(world
        .repos
        .assignments
        .organization_course_ids(org)
        .await
        .unwrap()
        .is_empty());

    let err = world
        .services
        .requests
        .resolve(&world.admin, Uuid::new_v4(), resolve("approve"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = world
        .services
        .requests
        .resolve(&world.admin, created.id, resolve("maybe"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let all = world.services.requests.list_all(&world.admin).await.unwrap();
    assert_eq!(all.total, 1);
    assert_eq!(all.pending, 0);
}
