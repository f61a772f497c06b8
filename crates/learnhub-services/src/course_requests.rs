//! Course purchase requests: pending → approved | rejected.

use std::sync::Arc;

use learnhub_core::models::{
    CourseRequest, CourseRequestList, CreateCourseRequestRequest, CreateRequestOutcome,
    NewCourseRequest, RequestAction, RequestResolution, ResolveCourseRequestRequest,
    ResolveRequestOutcome,
};
use learnhub_core::{Actor, AppError};
use learnhub_db::{CatalogRepository, CourseRequestRepository, Repositories, RequestFilter};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::found;

#[derive(Clone)]
pub struct CourseRequestService {
    requests: Arc<dyn CourseRequestRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl CourseRequestService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            requests: repos.requests.clone(),
            catalog: repos.catalog.clone(),
        }
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username, course_id = %request.course_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateCourseRequestRequest,
    ) -> Result<CourseRequest, AppError> {
        let organization_id = actor.require_portal_admin()?;
        if request.payment_amount < Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "Payment amount cannot be negative".to_string(),
            ));
        }
        found(self.catalog.get_course(request.course_id).await?, "Course")?;

        let outcome = self
            .requests
            .create_request(NewCourseRequest {
                organization_id,
                course_id: request.course_id,
                requested_by: actor.user_id,
                payment_amount: request.payment_amount,
            })
            .await?;

        match outcome {
            CreateRequestOutcome::Created(created) => {
                tracing::info!(request_id = %created.id, organization_id = %organization_id, "Course request created");
                Ok(created)
            }
            CreateRequestOutcome::AlreadyAssigned => Err(AppError::Conflict(
                "Course is already assigned to your organization".to_string(),
            )),
            CreateRequestOutcome::AlreadyPending => Err(AppError::Conflict(
                "A request for this course is already pending".to_string(),
            )),
        }
    }

    /// Requests the caller filed for their organization, newest first. Callers
    /// without an organization get an empty list.
    pub async fn my_requests(&self, actor: &Actor) -> Result<CourseRequestList, AppError> {
        let Some(organization_id) = actor.organization_id else {
            return Ok(CourseRequestList::new(Vec::new()));
        };

        let requests = self
            .requests
            .list_requests(RequestFilter {
                organization_id: Some(organization_id),
                requested_by: Some(actor.user_id),
            })
            .await?;
        Ok(CourseRequestList::new(requests))
    }

    pub async fn list_all(&self, actor: &Actor) -> Result<CourseRequestList, AppError> {
        actor.require_admin()?;
        let requests = self.requests.list_requests(RequestFilter::default()).await?;
        Ok(CourseRequestList::new(requests))
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username, request_id = %request_id))]
    pub async fn resolve(
        &self,
        actor: &Actor,
        request_id: Uuid,
        request: ResolveCourseRequestRequest,
    ) -> Result<CourseRequest, AppError> {
        actor.require_admin()?;
        let action: RequestAction = request
            .action
            .trim()
            .parse()
            .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string()))?;

        let outcome = self
            .requests
            .resolve_request(RequestResolution {
                request_id,
                action,
                resolved_by: actor.user_id,
                admin_notes: request
                    .admin_notes
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            })
            .await?;

        match outcome {
            ResolveRequestOutcome::Resolved(resolved) => {
                tracing::info!(
                    organization_id = %resolved.organization_id,
                    course_id = %resolved.course_id,
                    status = %resolved.status,
                    "Course request resolved"
                );
                Ok(resolved)
            }
            ResolveRequestOutcome::NotFound => {
                Err(AppError::NotFound("Course request not found".to_string()))
            }
            ResolveRequestOutcome::AlreadyResolved(status) => Err(AppError::Conflict(format!(
                "Course request is already {}",
                status
            ))),
        }
    }
}
