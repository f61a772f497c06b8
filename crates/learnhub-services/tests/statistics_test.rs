mod common;

use common::World;
use learnhub_core::models::{RecordInteractionRequest, SetRiskScoreRequest, Statistics};
use learnhub_core::AppError;
use serde_json::json;

fn complete() -> RecordInteractionRequest {
    RecordInteractionRequest {
        interaction_type: "content_complete".to_string(),
        data: json!({}),
    }
}

#[tokio::test]
async fn test_organization_statistics_without_enrollments() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    world.enroll_all(org, course.id).await;

    let Statistics::Organization(stats) = world.services.statistics.statistics(&portal).await.unwrap() else {
        panic!("portal admin should see organization statistics");
    };
    assert_eq!(stats.employee_count, 1);
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.active_courses, 0);
    assert_eq!(stats.completion_rate, 0);
    assert!(stats.top_courses.is_empty());
}

#[tokio::test]
async fn test_organization_statistics_completion_rate() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let bob = world.employee(&portal, "bob").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Basics").await;
    world.module(course.id, "Ownership").await;
    let video = world.content(module.id, "video").await;
    let short = world.course("Short").await;
    let only = world.module(short.id, "Only").await;
    let pdf = world.content(only.id, "pdf").await;
    world.enroll_all(org, course.id).await;
    world.enroll_all(org, short.id).await;

    for employee in [&alice, &bob] {
        world
            .services
            .tracking
            .record_interaction(employee, video.id, complete())
            .await
            .unwrap();
    }
    world
        .services
        .tracking
        .record_interaction(&alice, pdf.id, complete())
        .await
        .unwrap();

    let Statistics::Organization(stats) = world.services.statistics.statistics(&portal).await.unwrap() else {
        panic!("portal admin should see organization statistics");
    };
    assert_eq!(stats.active_courses, 2);
    // one of three enrollments is at 100%
    assert_eq!(stats.completion_rate, 33);
    assert_eq!(stats.top_courses[0].id, course.id);
    assert_eq!(stats.top_courses[0].enrollments, 2);
    assert_eq!(stats.top_courses[1].enrollments, 1);
}

#[tokio::test]
async fn test_system_statistics_for_admin() {
    let world = World::new().await;
    let (_, portal) = world.organization("acme").await;
    world.organization("globex").await;
    world.employee(&portal, "alice").await;
    world.course("Rust").await;

    let Statistics::System(stats) = world.services.statistics.statistics(&world.admin).await.unwrap() else {
        panic!("admin should see system statistics");
    };
    assert_eq!(stats.total_organizations, 2);
    assert_eq!(stats.active_organizations + stats.inactive_organizations, 2);
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.total_portal_admins, 2);
    assert_eq!(stats.total_employees, 1);
    assert_eq!(stats.total_users, 4);
    assert_eq!(stats.monthly_user_growth.len(), 6);
    assert_eq!(stats.monthly_user_growth.last().unwrap().count, 4);
    assert_eq!(stats.recent_organizations.len(), 2);
}

#[tokio::test]
async fn test_employees_cannot_read_statistics() {
    let world = World::new().await;
    let (_, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;

    let err = world.services.statistics.statistics(&alice).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_progress_report_breakdowns() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let bob = world.employee(&portal, "bob").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Basics").await;
    let video = world.content(module.id, "video").await;
    world.enroll_all(org, course.id).await;

    world
        .services
        .tracking
        .record_interaction(&alice, video.id, complete())
        .await
        .unwrap();
    world
        .services
        .statistics
        .set_risk_score(&portal, alice.user_id, course.id, SetRiskScoreRequest { risk_score: 90 })
        .await
        .unwrap();

    let report = world
        .services
        .statistics
        .organization_report(&portal, org)
        .await
        .unwrap();
    assert_eq!(report.total_employees, 2);
    assert_eq!(report.total_courses, 1);
    assert_eq!(report.overview.completed, 1);
    assert_eq!(report.overview.not_started, 0);
    assert_eq!(report.overall_completion_rate, 100.0);

    let breakdown = &report.course_statistics[0];
    assert_eq!(breakdown.enrolled, 1);
    assert_eq!(breakdown.completed, 1);
    assert_eq!(breakdown.at_risk, 1);

    assert_eq!(report.employees_at_risk_count, 1);
    assert_eq!(report.employees_at_risk[0].employee_id, alice.user_id);

    let bob_row = report
        .employee_statistics
        .iter()
        .find(|e| e.employee_id == bob.user_id)
        .unwrap();
    assert_eq!(bob_row.assigned_courses, 1);
    assert_eq!(bob_row.completed, 0);
    assert_eq!(bob_row.avg_progress, 0.0);
}
