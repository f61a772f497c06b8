//! Course catalog authoring handlers (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use learnhub_core::models::{
    AdminQuizQuestion, AdminQuizView, Course, CourseDetail, CourseSummary, CreateContentRequest,
    CreateCourseRequest, CreateModuleRequest, CreateQuestionRequest, Module, ModuleContent,
    ReplaceOptionsRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::{validated, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "catalog",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_course(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let course = state.services.catalog.create_course(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "catalog",
    responses(
        (status = 200, description = "All courses, newest first", body = Vec<CourseSummary>),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_courses(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let courses = state.services.catalog.list_courses(&actor).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with modules and contents", body = CourseDetail),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_course(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detail = state.services.catalog.get_course(&actor, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course and everything attached to it removed"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_course(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.services.catalog.delete_course(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/modules",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CreateModuleRequest,
    responses(
        (status = 201, description = "Module created", body = Module),
        (status = 404, description = "Course not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_module(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateModuleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let module = state.services.catalog.create_module(&actor, id, req).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{id}/contents",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Content created", body = ModuleContent),
        (status = 400, description = "Unknown content type or missing file", body = crate::error::ErrorResponse),
        (status = 404, description = "Module not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_content(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateContentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let content = state.services.catalog.create_content(&actor, id, req).await?;
    Ok((StatusCode::CREATED, Json(content)))
}

#[utoipa::path(
    get,
    path = "/api/v1/contents/{id}/questions",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Quiz content ID")),
    responses(
        (status = 200, description = "Quiz with correct answers marked", body = AdminQuizView),
        (status = 404, description = "Quiz not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn admin_quiz(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let quiz = state.services.catalog.admin_quiz(&actor, id).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    post,
    path = "/api/v1/contents/{id}/questions",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Quiz content ID")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = AdminQuizQuestion),
        (status = 400, description = "Invalid options or not quiz content", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_question(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let question = state.services.catalog.create_question(&actor, id, req).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}/options",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = ReplaceOptionsRequest,
    responses(
        (status = 200, description = "Options replaced", body = AdminQuizQuestion),
        (status = 400, description = "Invalid options", body = crate::error::ErrorResponse),
        (status = 404, description = "Question not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn replace_question_options(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ReplaceOptionsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let question = state
        .services
        .catalog
        .replace_question_options(&actor, id, req)
        .await?;
    Ok(Json(question))
}
