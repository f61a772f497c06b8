//! Statistics, progress report and risk score handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use learnhub_core::models::{
    CourseProgress, OrganizationProgressReport, SetRiskScoreRequest, Statistics,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::{validated, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    tag = "statistics",
    responses(
        (status = 200, description = "System statistics for admins, organization statistics for portal admins", body = Statistics),
        (status = 403, description = "Not available to employees", body = crate::error::ErrorResponse),
    )
)]
pub async fn statistics(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let statistics = state.services.statistics.statistics(&actor).await?;
    Ok(Json(statistics))
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}/report",
    tag = "statistics",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Per-course and per-employee progress breakdown", body = OrganizationProgressReport),
        (status = 403, description = "Not allowed to manage this organization", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn organization_report(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let report = state
        .services
        .statistics
        .organization_report(&actor, id)
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    put,
    path = "/api/v1/progress/{user_id}/{course_id}/risk-score",
    tag = "statistics",
    params(
        ("user_id" = Uuid, Path, description = "Employee user ID"),
        ("course_id" = Uuid, Path, description = "Course ID"),
    ),
    request_body = SetRiskScoreRequest,
    responses(
        (status = 200, description = "Risk score recorded", body = CourseProgress),
        (status = 400, description = "Score outside 0..=100", body = crate::error::ErrorResponse),
        (status = 404, description = "No progress recorded", body = crate::error::ErrorResponse),
    )
)]
pub async fn set_risk_score(
    CurrentActor(actor): CurrentActor,
    Path((user_id, course_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SetRiskScoreRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let progress = state
        .services
        .statistics
        .set_risk_score(&actor, user_id, course_id, req)
        .await?;
    Ok(Json(progress))
}
