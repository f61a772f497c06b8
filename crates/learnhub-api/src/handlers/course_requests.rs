//! Course purchase request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use learnhub_core::models::{
    CourseRequest, CourseRequestList, CreateCourseRequestRequest, ResolveCourseRequestRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::{validated, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/course-requests",
    tag = "course-requests",
    request_body = CreateCourseRequestRequest,
    responses(
        (status = 201, description = "Request filed", body = CourseRequest),
        (status = 400, description = "Negative payment amount", body = crate::error::ErrorResponse),
        (status = 409, description = "Course already assigned or already pending", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_course_request(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCourseRequestRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = state.services.requests.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/v1/course-requests/mine",
    tag = "course-requests",
    responses(
        (status = 200, description = "Requests filed by the caller, newest first", body = CourseRequestList),
    )
)]
pub async fn my_course_requests(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let requests = state.services.requests.my_requests(&actor).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/api/v1/course-requests",
    tag = "course-requests",
    responses(
        (status = 200, description = "All requests, newest first", body = CourseRequestList),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_course_requests(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let requests = state.services.requests.list_all(&actor).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    post,
    path = "/api/v1/course-requests/{id}/resolve",
    tag = "course-requests",
    params(("id" = Uuid, Path, description = "Course request ID")),
    request_body = ResolveCourseRequestRequest,
    responses(
        (status = 200, description = "Request approved or rejected", body = CourseRequest),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Request already resolved", body = crate::error::ErrorResponse),
    )
)]
pub async fn resolve_course_request(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResolveCourseRequestRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let resolved = state.services.requests.resolve(&actor, id, req).await?;
    Ok(Json(resolved))
}
