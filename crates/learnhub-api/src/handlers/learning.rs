//! Employee learning handlers: enrolled courses, content interactions and quizzes

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use learnhub_core::models::{
    EmployeeContentView, EmployeeCourseDetail, EmployeeQuizView, EnrolledCourse, InteractionOutcome, QuizResult,
    QuizSubmission, RecordInteractionRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::{validated, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/me/courses",
    tag = "learning",
    responses(
        (status = 200, description = "Courses the caller can currently access, with progress", body = Vec<EnrolledCourse>),
        (status = 403, description = "Employee access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn my_courses(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let courses = state.services.availability.my_courses(&actor).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/v1/me/courses/{id}",
    tag = "learning",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course structure with module completion", body = EmployeeCourseDetail),
        (status = 403, description = "Course not accessible", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn my_course_detail(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detail = state.services.tracking.course_detail(&actor, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/me/contents/{id}",
    tag = "learning",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Content item of an accessible course", body = EmployeeContentView),
        (status = 403, description = "Course not accessible", body = crate::error::ErrorResponse),
        (status = 404, description = "Content not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn my_content(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let content = state.services.tracking.content(&actor, id).await?;
    Ok(Json(content))
}

#[utoipa::path(
    post,
    path = "/api/v1/contents/{id}/interactions",
    tag = "learning",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = RecordInteractionRequest,
    responses(
        (status = 200, description = "Interaction stored; module auto-completed when the threshold is met", body = InteractionOutcome),
        (status = 400, description = "Unknown interaction type, malformed payload, or an event that does not fit the content type", body = crate::error::ErrorResponse),
        (status = 403, description = "Course not accessible", body = crate::error::ErrorResponse),
        (status = 404, description = "Content not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn record_interaction(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RecordInteractionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let outcome = state
        .services
        .tracking
        .record_interaction(&actor, id, req)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{id}",
    tag = "learning",
    params(("id" = Uuid, Path, description = "Quiz content ID")),
    responses(
        (status = 200, description = "Questions and options without answers", body = EmployeeQuizView),
        (status = 403, description = "Course not accessible", body = crate::error::ErrorResponse),
        (status = 404, description = "Quiz not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn employee_quiz(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let quiz = state.services.quizzes.employee_quiz(&actor, id).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{id}/submissions",
    tag = "learning",
    params(("id" = Uuid, Path, description = "Quiz content ID")),
    request_body = QuizSubmission,
    responses(
        (status = 200, description = "Graded submission", body = QuizResult),
        (status = 403, description = "Course not accessible", body = crate::error::ErrorResponse),
        (status = 404, description = "Quiz not found or has no questions", body = crate::error::ErrorResponse),
    )
)]
pub async fn submit_quiz(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<QuizSubmission>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state.services.quizzes.submit(&actor, id, req).await?;
    Ok(Json(result))
}
