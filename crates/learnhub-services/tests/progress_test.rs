mod common;

use common::World;
use learnhub_core::models::{
    CreateQuestionRequest, QuizOptionInput, QuizSubmission, RecordInteractionRequest,
    SetRiskScoreRequest, SubmittedAnswer,
};
use learnhub_core::AppError;
use serde_json::json;
use uuid::Uuid;

fn interaction(kind: &str, data: serde_json::Value) -> RecordInteractionRequest {
    RecordInteractionRequest {
        interaction_type: kind.to_string(),
        data,
    }
}

fn option(text: &str, is_correct: bool) -> QuizOptionInput {
    QuizOptionInput {
        option_text: text.to_string(),
        is_correct,
    }
}

#[tokio::test]
async fn test_two_module_course_completes_through_interactions() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let first = world.module(course.id, "Basics").await;
    let second = world.module(course.id, "Ownership").await;
    let video = world.content(first.id, "video").await;
    let quiz = world.content(second.id, "quiz").await;
    world.enroll_all(org, course.id).await;

    let question = world
        .services
        .catalog
        .create_question(
            &world.admin,
            quiz.id,
            CreateQuestionRequest {
                question_text: "Who owns a moved value?".to_string(),
                question_type: "single-choice".to_string(),
                options: vec![option("The receiver", true), option("Nobody", false)],
                position: None,
            },
        )
        .await
        .unwrap();
    let correct = question.options.iter().find(|o| o.is_correct).unwrap().id;

    let outcome = world
        .services
        .tracking
        .record_interaction(
            &alice,
            video.id,
            interaction(
                "video_progress",
                json!({"current_time": 95.0, "duration": 100.0}),
            ),
        )
        .await
        .unwrap();
    assert!(outcome.module_auto_completed);
    let snapshot = outcome.progress.unwrap();
    assert_eq!(snapshot.completed_modules, 1);
    assert_eq!(snapshot.total_modules, 2);
    assert_eq!(snapshot.progress_percentage, 50.0);
    assert!(snapshot.completion_date.is_none());

    let result = world
        .services
        .quizzes
        .submit(
            &alice,
            quiz.id,
            QuizSubmission {
                answers: vec![SubmittedAnswer {
                    question_id: question.id,
                    selected_option_ids: vec![correct],
                }],
            },
        )
        .await
        .unwrap();
    assert!(result.passed);
    assert_eq!(result.percentage, 100.0);

    let progress = world
        .repos
        .progress
        .get_progress(alice.user_id, course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.progress_percentage, 100.0);
    assert_eq!(progress.completed_modules, 2);
    assert!(progress.completion_date.is_some());
    assert_eq!(progress.risk_score, 0);
    assert!(progress.module_progress.is_completed(&first.id));
    assert!(progress.module_progress.is_completed(&second.id));

    let courses = world.services.availability.my_courses(&alice).await.unwrap();
    assert!(courses[0].is_completed);
}

#[tokio::test]
async fn test_repeated_completion_counts_module_once() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let first = world.module(course.id, "Basics").await;
    world.module(course.id, "Ownership").await;
    let video = world.content(first.id, "video").await;
    let pdf = world.content(first.id, "pdf").await;
    world.enroll_all(org, course.id).await;

    for _ in 0..3 {
        world
            .services
            .tracking
            .record_interaction(&alice, video.id, interaction("content_complete", json!({})))
            .await
            .unwrap();
    }
    let outcome = world
        .services
        .tracking
        .record_interaction(&alice, pdf.id, interaction("content_complete", json!({})))
        .await
        .unwrap();
    assert!(!outcome.module_auto_completed);

    let progress = world
        .repos
        .progress
        .get_progress(alice.user_id, course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.completed_modules, 1);
    assert_eq!(progress.progress_percentage, 50.0);
}

#[tokio::test]
async fn test_pdf_weighted_threshold() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Reading").await;
    let pdf = world.content(module.id, "pdf").await;
    world.enroll_all(org, course.id).await;

    let short = world
        .services
        .tracking
        .record_interaction(
            &alice,
            pdf.id,
            interaction(
                "pdf_progress",
                json!({"pages_viewed": [1, 2, 3, 4, 5, 6, 7], "total_pages": 10, "time_spent_seconds": 80.0}),
            ),
        )
        .await
        .unwrap();
    assert!(short.progress.is_none());

    let enough = world
        .services
        .tracking
        .record_interaction(
            &alice,
            pdf.id,
            interaction(
                "pdf_progress",
                json!({"pages_viewed": [1, 2, 3, 4, 5, 6, 7, 8, 8], "total_pages": 10, "time_spent_seconds": 80.0}),
            ),
        )
        .await
        .unwrap();
    assert!(enough.module_auto_completed);

    let stored = world
        .repos
        .progress
        .get_interaction(alice.user_id, pdf.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.interaction_data["overall_completion"], json!(80.0));
    assert_eq!(stored.interaction_data["pages_viewed"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_failed_quiz_keeps_module_open() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Traits").await;
    let quiz = world.content(module.id, "quiz").await;
    world.enroll_all(org, course.id).await;

    let question = world
        .services
        .catalog
        .create_question(
            &world.admin,
            quiz.id,
            CreateQuestionRequest {
                question_text: "Which are object safe?".to_string(),
                question_type: "multiple-choice".to_string(),
                options: vec![
                    option("Display", true),
                    option("Debug", true),
                    option("Clone", false),
                ],
                position: None,
            },
        )
        .await
        .unwrap();
    let display = question
        .options
        .iter()
        .find(|o| o.option_text == "Display")
        .unwrap()
        .id;

    let result = world
        .services
        .quizzes
        .submit(
            &alice,
            quiz.id,
            QuizSubmission {
                answers: vec![SubmittedAnswer {
                    question_id: question.id,
                    selected_option_ids: vec![display],
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.score, 0);
    assert!(!result.passed);
    assert!(world
        .repos
        .progress
        .get_progress(alice.user_id, course.id)
        .await
        .unwrap()
        .is_none());

    let stored = world
        .repos
        .progress
        .get_interaction(alice.user_id, quiz.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.interaction_data["passed"], json!(false));
}

#[tokio::test]
async fn test_employee_quiz_hides_correct_answers() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Lifetimes").await;
    let quiz = world.content(module.id, "quiz").await;
    world.enroll_all(org, course.id).await;

    world
        .services
        .catalog
        .create_question(
            &world.admin,
            quiz.id,
            CreateQuestionRequest {
                question_text: "Is 'static a lifetime?".to_string(),
                question_type: "true-false".to_string(),
                options: vec![option("True", true), option("False", false)],
                position: None,
            },
        )
        .await
        .unwrap();

    let view = world.services.quizzes.employee_quiz(&alice, quiz.id).await.unwrap();
    let encoded = serde_json::to_value(&view).unwrap();
    assert_eq!(view.questions.len(), 1);
    assert!(!encoded.to_string().contains("is_correct"));
}

#[tokio::test]
async fn test_interaction_requires_course_access() {
    let world = World::new().await;
    let (_, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Basics").await;
    let video = world.content(module.id, "video").await;

    let err = world
        .services
        .tracking
        .record_interaction(&alice, video.id, interaction("content_complete", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = world
        .services
        .tracking
        .record_interaction(&alice, Uuid::new_v4(), interaction("content_complete", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = world
        .services
        .tracking
        .record_interaction(&alice, video.id, interaction("page_flip", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_risk_score_bounds_and_ownership() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let (_, other_portal) = world.organization("globex").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Basics").await;
    let video = world.content(module.id, "video").await;
    world.enroll_all(org, course.id).await;

    let err = world
        .services
        .statistics
        .set_risk_score(&portal, alice.user_id, course.id, SetRiskScoreRequest { risk_score: 85 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    world
        .services
        .tracking
        .record_interaction(&alice, video.id, interaction("content_complete", json!({})))
        .await
        .unwrap();

    let err = world
        .services
        .statistics
        .set_risk_score(&portal, alice.user_id, course.id, SetRiskScoreRequest { risk_score: 101 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = world
        .services
        .statistics
        .set_risk_score(&other_portal, alice.user_id, course.id, SetRiskScoreRequest { risk_score: 85 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let progress = world
        .services
        .statistics
        .set_risk_score(&portal, alice.user_id, course.id, SetRiskScoreRequest { risk_score: 85 })
        .await
        .unwrap();
    assert_eq!(progress.risk_score, 85);
}

#[tokio::test]
async fn test_quiz_items_only_complete_through_grading() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Traits").await;
    let quiz = world.content(module.id, "quiz").await;
    world.enroll_all(org, course.id).await;

    for (kind, data) in [
        ("quiz_completed", json!({"passed": true})),
        ("content_complete", json!({})),
    ] {
        let err = world
            .services
            .tracking
            .record_interaction(&alice, quiz.id, interaction(kind, data))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{} accepted", kind);
    }

    assert!(world
        .repos
        .progress
        .get_progress(alice.user_id, course.id)
        .await
        .unwrap()
        .is_none());
    assert!(world
        .repos
        .progress
        .get_interaction(alice.user_id, quiz.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_progress_event_must_match_content_type() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Reading").await;
    let video = world.content(module.id, "video").await;
    let pdf = world.content(module.id, "pdf").await;
    world.enroll_all(org, course.id).await;

    let err = world
        .services
        .tracking
        .record_interaction(
            &alice,
            pdf.id,
            interaction(
                "video_progress",
                json!({"current_time": 99.0, "duration": 100.0}),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = world
        .services
        .tracking
        .record_interaction(
            &alice,
            video.id,
            interaction(
                "pdf_progress",
                json!({"pages_viewed": [1, 2], "total_pages": 2, "time_spent_seconds": 60.0}),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    assert!(world
        .repos
        .progress
        .get_progress(alice.user_id, course.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_employee_opens_content_of_assigned_course_only() {
    let world = World::new().await;
    let (org, portal) = world.organization("acme").await;
    let alice = world.employee(&portal, "alice").await;
    let course = world.course("Rust").await;
    let module = world.module(course.id, "Traits").await;
    let video = world.content(module.id, "video").await;
    let quiz = world.content(module.id, "quiz").await;
    let other = world.course("Go").await;
    let other_module = world.module(other.id, "Goroutines").await;
    let hidden = world.content(other_module.id, "pdf").await;
    world.enroll_all(org, course.id).await;

    world
        .services
        .catalog
        .create_question(
            &world.admin,
            quiz.id,
            CreateQuestionRequest {
                question_text: "Is Send an auto trait?".to_string(),
                question_type: "true-false".to_string(),
                options: vec![option("True", true), option("False", false)],
                position: None,
            },
        )
        .await
        .unwrap();

    let view = world.services.tracking.content(&alice, video.id).await.unwrap();
    assert_eq!(view.content.id, video.id);
    assert_eq!(view.course_id, course.id);
    assert!(view.question_count.is_none());

    let view = world.services.tracking.content(&alice, quiz.id).await.unwrap();
    assert_eq!(view.question_count, Some(1));

    let err = world
        .services
        .tracking
        .content(&alice, hidden.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = world
        .services
        .tracking
        .content(&alice, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
