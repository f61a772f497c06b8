use chrono::Utc;
use learnhub_core::models::{
    CourseRequest, CreateRequestOutcome, NewCourseRequest, RequestAction, RequestResolution,
    RequestStatus, ResolveRequestOutcome,
};
use learnhub_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::db::traits::{CourseRequestRepository, RequestFilter};
use crate::db::transaction::TransactionGuard;

const REQUEST_COLUMNS: &str = "id, organization_id, course_id, requested_by, requested_at, status, \
     payment_amount, admin_notes, approved_by, approved_at";

#[derive(Clone)]
pub struct PostgresCourseRequestRepository {
    pool: PgPool,
}

impl PostgresCourseRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CourseRequestRepository for PostgresCourseRequestRepository {
    #[tracing::instrument(skip(self, request), fields(db.table = "course_requests", db.operation = "insert", organization_id = %request.organization_id, course_id = %request.course_id))]
    async fn create_request(
        &self,
        request: NewCourseRequest,
    ) -> Result<CreateRequestOutcome, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query("SELECT id FROM organizations WHERE id = $1 FOR UPDATE")
            .bind(request.organization_id)
            .execute(tx.conn())
            .await?;

        let assigned: Option<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM organization_courses WHERE organization_id = $1 AND course_id = $2",
        )
        .bind(request.organization_id)
        .bind(request.course_id)
        .fetch_optional(tx.conn())
        .await?;
        if assigned.is_some() {
            return Ok(CreateRequestOutcome::AlreadyAssigned);
        }

        let pending: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM course_requests WHERE organization_id = $1 AND course_id = $2 AND status = 'pending'",
        )
        .bind(request.organization_id)
        .bind(request.course_id)
        .fetch_optional(tx.conn())
        .await?;
        if pending.is_some() {
            return Ok(CreateRequestOutcome::AlreadyPending);
        }

        let created = sqlx::query_as::<Postgres, CourseRequest>(&format!(
            r#"
            INSERT INTO course_requests (id, organization_id, course_id, requested_by, payment_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(request.organization_id)
        .bind(request.course_id)
        .bind(request.requested_by)
        .bind(request.payment_amount)
        .fetch_one(tx.conn())
        .await?;

        tx.commit().await?;
        Ok(CreateRequestOutcome::Created(created))
    }

    #[tracing::instrument(skip(self), fields(db.table = "course_requests", db.operation = "select"))]
    async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<CourseRequest>, AppError> {
        let requests = sqlx::query_as::<Postgres, CourseRequest>(&format!(
            r#"
            SELECT {}
            FROM course_requests
            WHERE ($1::uuid IS NULL OR organization_id = $1)
              AND ($2::uuid IS NULL OR requested_by = $2)
            ORDER BY requested_at DESC, id
            "#,
            REQUEST_COLUMNS
        ))
        .bind(filter.organization_id)
        .bind(filter.requested_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    #[tracing::instrument(skip(self), fields(db.table = "course_requests", db.operation = "select"))]
    async fn pending_course_ids(&self, organization_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT course_id FROM course_requests WHERE organization_id = $1 AND status = 'pending'",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self, resolution), fields(db.table = "course_requests", db.operation = "update", request_id = %resolution.request_id))]
    async fn resolve_request(
        &self,
        resolution: RequestResolution,
    ) -> Result<ResolveRequestOutcome, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let current = sqlx::query_as::<Postgres, CourseRequest>(&format!(
            "SELECT {} FROM course_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(resolution.request_id)
        .fetch_optional(tx.conn())
        .await?;

        let current = match current {
            None => return Ok(ResolveRequestOutcome::NotFound),
            Some(r) if r.status != RequestStatus::Pending => {
                return Ok(ResolveRequestOutcome::AlreadyResolved(r.status))
            }
            Some(r) => r,
        };

        let updated = sqlx::query_as::<Postgres, CourseRequest>(&format!(
            r#"
            UPDATE course_requests
            SET status = $2, approved_by = $3, approved_at = $4, admin_notes = $5
            WHERE id = $1
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(current.id)
        .bind(resolution.action.resulting_status())
        .bind(resolution.resolved_by)
        .bind(Utc::now())
        .bind(&resolution.admin_notes)
        .fetch_one(tx.conn())
        .await?;

        if resolution.action == RequestAction::Approve {
            sqlx::query(
                "INSERT INTO organization_courses (organization_id, course_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(current.organization_id)
            .bind(current.course_id)
            .execute(tx.conn())
            .await?;
        }

        tx.commit().await?;
        Ok(ResolveRequestOutcome::Resolved(updated))
    }
}
