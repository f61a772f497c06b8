//! Organization and employee directory handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use learnhub_core::models::{
    CreateEmployeeRequest, CreateOrganizationRequest, CreatedOrganization, DirectoryEntry,
    Organization, OrganizationDeletion, OrganizationWithCourses, UpdateOrganizationStatusRequest,
    User,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::{validated, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    tag = "organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization and portal admin created", body = CreatedOrganization),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 409, description = "Name or portal admin already taken", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_organization(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let created = state
        .services
        .directory
        .create_organization(&actor, req)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    tag = "organizations",
    responses(
        (status = 200, description = "Organizations, newest first", body = Vec<OrganizationWithCourses>),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_organizations(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state.services.directory.list_organizations(&actor).await?;
    Ok(Json(organizations))
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization with its course set", body = OrganizationWithCourses),
        (status = 403, description = "Not allowed to manage this organization", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_organization(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = state.services.directory.get_organization(&actor, id).await?;
    Ok(Json(organization))
}

#[utoipa::path(
    put,
    path = "/api/v1/organizations/{id}/status",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UpdateOrganizationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Organization),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_organization_status(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<UpdateOrganizationStatusRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let organization = state
        .services
        .directory
        .update_organization_status(&actor, id, req)
        .await?;
    Ok(Json(organization))
}

#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization and its users removed", body = OrganizationDeletion),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_organization(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deletion = state
        .services
        .directory
        .delete_organization(&actor, id)
        .await?;
    Ok(Json(deletion))
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    tag = "employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created and enrolled in the organization's courses", body = User),
        (status = 403, description = "Portal admin access required", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already taken", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_employee(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let req = validated(req)?;
    let employee = state.services.directory.create_employee(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = "employees",
    responses(
        (status = 200, description = "Employees of the caller's organization", body = Vec<User>),
        (status = 403, description = "Portal admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_employees(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let employees = state.services.directory.list_employees(&actor).await?;
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Every account with its organization", body = Vec<DirectoryEntry>),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_users(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let users = state.services.directory.list_users(&actor).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/portal-admins",
    tag = "users",
    responses(
        (status = 200, description = "Portal admins with their organization", body = Vec<DirectoryEntry>),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_portal_admins(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let admins = state.services.directory.list_portal_admins(&actor).await?;
    Ok(Json(admins))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    tag = "employees",
    params(("id" = Uuid, Path, description = "Employee user ID")),
    responses(
        (status = 204, description = "Employee removed"),
        (status = 404, description = "No such employee in the caller's organization", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_employee(
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.services.directory.delete_employee(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
