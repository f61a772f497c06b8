//! Course availability handlers: organization and employee course sets, and the
//! portal admin's catalog.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use learnhub_core::models::{
    AssignCourseRequest, AssignmentResult, CourseAssignees, CourseSetReplacement, PortalCourse,
    ReplaceOrganizationCoursesRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/api/v1/organizations/{id}/courses",
    tag = "course-availability",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = ReplaceOrganizationCoursesRequest,
    responses(
        (status = 200, description = "Course set replaced; every employee resynchronized", body = CourseSetReplacement),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "Organization or course not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn replace_organization_courses(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ReplaceOrganizationCoursesRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let replacement = state
        .services
        .availability
        .replace_organization_courses(&actor, id, &req.course_ids)
        .await?;
    Ok(Json(replacement))
}

#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/courses",
    tag = "course-availability",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = AssignCourseRequest,
    responses(
        (status = 200, description = "Course offered to the organization; employees untouched", body = AssignmentResult),
        (status = 403, description = "Caller manages a different organization", body = crate::error::ErrorResponse),
        (status = 409, description = "Course already assigned", body = crate::error::ErrorResponse),
    )
)]
pub async fn assign_course_to_organization(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<AssignCourseRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state
        .services
        .availability
        .assign_course_to_organization(&actor, id, req.course_id)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}/courses/{course_id}",
    tag = "course-availability",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("course_id" = Uuid, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course withdrawn from the organization and its employees", body = AssignmentResult),
        (status = 403, description = "Caller manages a different organization", body = crate::error::ErrorResponse),
        (status = 404, description = "Course not assigned to the organization", body = crate::error::ErrorResponse),
    )
)]
pub async fn unassign_course_from_organization(
    CurrentActor(actor): CurrentActor,
    Path((id, course_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state
        .services
        .availability
        .unassign_course_from_organization(&actor, id, course_id)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/courses/{course_id}/assign-all",
    tag = "course-availability",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("course_id" = Uuid, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course pushed to every employee lacking it", body = AssignmentResult),
        (status = 400, description = "Course not offered to the organization", body = crate::error::ErrorResponse),
    )
)]
pub async fn assign_course_to_all_employees(
    CurrentActor(actor): CurrentActor,
    Path((id, course_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state
        .services
        .availability
        .assign_course_to_all_employees(&actor, id, course_id)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/employees/{id}/courses",
    tag = "course-availability",
    params(("id" = Uuid, Path, description = "Employee user ID")),
    request_body = AssignCourseRequest,
    responses(
        (status = 200, description = "Course assigned", body = AssignmentResult),
        (status = 400, description = "Course not offered to the employee's organization", body = crate::error::ErrorResponse),
        (status = 409, description = "Course already assigned", body = crate::error::ErrorResponse),
    )
)]
pub async fn assign_course_to_employee(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<AssignCourseRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state
        .services
        .availability
        .assign_course_to_employee(&actor, id, req.course_id)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}/courses/{course_id}",
    tag = "course-availability",
    params(
        ("id" = Uuid, Path, description = "Employee user ID"),
        ("course_id" = Uuid, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course removed from the employee", body = AssignmentResult),
        (status = 400, description = "Course not assigned to the employee", body = crate::error::ErrorResponse),
    )
)]
pub async fn unassign_course_from_employee(
    CurrentActor(actor): CurrentActor,
    Path((id, course_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state
        .services
        .availability
        .unassign_course_from_employee(&actor, id, course_id)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/portal/courses",
    tag = "portal",
    responses(
        (status = 200, description = "Published courses with price and availability", body = Vec<PortalCourse>),
        (status = 403, description = "Portal admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn portal_course_catalog(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let courses = state
        .services
        .availability
        .portal_course_catalog(&actor)
        .await?;
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/v1/portal/courses/{id}/assignees",
    tag = "portal",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Employees holding the course", body = CourseAssignees),
        (status = 404, description = "Course not offered to the organization", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_course_assignees(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let assignees = state
        .services
        .availability
        .list_course_assignees(&actor, id)
        .await?;
    Ok(Json(assignees))
}
