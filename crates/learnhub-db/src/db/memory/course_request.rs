use chrono::Utc;
use learnhub_core::models::{
    CourseRequest, CreateRequestOutcome, NewCourseRequest, RequestAction, RequestResolution,
    RequestStatus, ResolveRequestOutcome,
};
use learnhub_core::AppError;
use uuid::Uuid;

use super::MemoryStore;
use crate::db::traits::{CourseRequestRepository, RequestFilter};

#[async_trait::async_trait]
impl CourseRequestRepository for MemoryStore {
    async fn create_request(
        &self,
        request: NewCourseRequest,
    ) -> Result<CreateRequestOutcome, AppError> {
        let mut state = self.state.write().await;

        if state.organization_has_course(request.organization_id, request.course_id) {
            return Ok(CreateRequestOutcome::AlreadyAssigned);
        }
        if state.requests.iter().any(|r| {
            r.organization_id == request.organization_id
                && r.course_id == request.course_id
                && r.status == RequestStatus::Pending
        }) {
            return Ok(CreateRequestOutcome::AlreadyPending);
        }

        let created = CourseRequest {
            id: Uuid::new_v4(),
            organization_id: request.organization_id,
            course_id: request.course_id,
            requested_by: request.requested_by,
            requested_at: Utc::now(),
            status: RequestStatus::Pending,
            payment_amount: request.payment_amount.round_dp(2),
            admin_notes: None,
            approved_by: None,
            approved_at: None,
        };
        state.requests.push(created.clone());
        Ok(CreateRequestOutcome::Created(created))
    }

    async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<CourseRequest>, AppError> {
        let state = self.state.read().await;
        let mut requests: Vec<CourseRequest> = state
            .requests
            .iter()
            .filter(|r| filter.organization_id.map_or(true, |id| r.organization_id == id))
            .filter(|r| filter.requested_by.map_or(true, |id| r.requested_by == id))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn pending_course_ids(&self, organization_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.organization_id == organization_id && r.status == RequestStatus::Pending)
            .map(|r| r.course_id)
            .collect())
    }

    async fn resolve_request(
        &self,
        resolution: RequestResolution,
    ) -> Result<ResolveRequestOutcome, AppError> {
        let mut state = self.state.write().await;

        let Some(request) = state
            .requests
            .iter_mut()
            .find(|r| r.id == resolution.request_id)
        else {
            return Ok(ResolveRequestOutcome::NotFound);
        };
        if request.status != RequestStatus::Pending {
            return Ok(ResolveRequestOutcome::AlreadyResolved(request.status));
        }

        request.status = resolution.action.resulting_status();
        request.approved_by = Some(resolution.resolved_by);
        request.approved_at = Some(Utc::now());
        request.admin_notes = resolution.admin_notes;
        let resolved = request.clone();

        if resolution.action == RequestAction::Approve {
            let courses = state
                .organization_courses
                .entry(resolved.organization_id)
                .or_default();
            if !courses.contains(&resolved.course_id) {
                courses.push(resolved.course_id);
            }
        }

        Ok(ResolveRequestOutcome::Resolved(resolved))
    }
}
