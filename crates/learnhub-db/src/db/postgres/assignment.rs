use learnhub_core::models::{BulkAssignment, CourseSetReplacement, EmployeeAssignment, User};
use learnhub_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::db::traits::AssignmentRepository;
use crate::db::transaction::TransactionGuard;

#[derive(Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "organization_courses", db.operation = "select"))]
    async fn organization_course_ids(&self, organization_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT course_id FROM organization_courses WHERE organization_id = $1 ORDER BY assigned_at, course_id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_courses", db.operation = "select"))]
    async fn user_course_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT course_id FROM user_courses WHERE user_id = $1 ORDER BY assigned_at, course_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self, course_ids), fields(db.table = "organization_courses", db.operation = "replace", course_count = course_ids.len()))]
    async fn replace_organization_courses(
        &self,
        organization_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<CourseSetReplacement, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        // serialize concurrent edits of this organization's edges
        sqlx::query("SELECT id FROM organizations WHERE id = $1 FOR UPDATE")
            .bind(organization_id)
            .execute(tx.conn())
            .await?;

        sqlx::query("DELETE FROM organization_courses WHERE organization_id = $1")
            .bind(organization_id)
            .execute(tx.conn())
            .await?;

        sqlx::query(
            r#"
            INSERT INTO organization_courses (organization_id, course_id)
            SELECT $1, course_id FROM UNNEST($2::uuid[]) AS course_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(organization_id)
        .bind(course_ids)
        .execute(tx.conn())
        .await?;

        let employee_ids = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT id FROM users WHERE organization_id = $1 AND role = 'employee'",
        )
        .bind(organization_id)
        .fetch_all(tx.conn())
        .await?;

        sqlx::query("DELETE FROM user_courses WHERE user_id = ANY($1)")
            .bind(&employee_ids)
            .execute(tx.conn())
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_courses (user_id, course_id)
            SELECT u.id, oc.course_id
            FROM UNNEST($1::uuid[]) AS u(id)
            CROSS JOIN organization_courses oc
            WHERE oc.organization_id = $2
            "#,
        )
        .bind(&employee_ids)
        .bind(organization_id)
        .execute(tx.conn())
        .await?;

        let assigned_course_ids = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT course_id FROM organization_courses WHERE organization_id = $1 ORDER BY course_id",
        )
        .bind(organization_id)
        .fetch_all(tx.conn())
        .await?;

        tx.commit().await?;

        Ok(CourseSetReplacement {
            organization_id,
            assigned_course_ids,
            employees_updated: employee_ids.len() as u64,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_courses", db.operation = "insert"))]
    async fn add_organization_course(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO organization_courses (organization_id, course_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(organization_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_courses", db.operation = "delete"))]
    async fn remove_organization_course(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<u64>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let removed = sqlx::query(
            "DELETE FROM organization_courses WHERE organization_id = $1 AND course_id = $2",
        )
        .bind(organization_id)
        .bind(course_id)
        .execute(tx.conn())
        .await?;
        if removed.rows_affected() == 0 {
            return Ok(None);
        }

        let employees = sqlx::query(
            r#"
            DELETE FROM user_courses
            WHERE course_id = $2
              AND user_id IN (SELECT id FROM users WHERE organization_id = $1 AND role = 'employee')
            "#,
        )
        .bind(organization_id)
        .bind(course_id)
        .execute(tx.conn())
        .await?;

        tx.commit().await?;
        Ok(Some(employees.rows_affected()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_courses", db.operation = "insert"))]
    async fn assign_course_to_all_employees(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<BulkAssignment, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let offered: Option<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM organization_courses WHERE organization_id = $1 AND course_id = $2 FOR SHARE",
        )
        .bind(organization_id)
        .bind(course_id)
        .fetch_optional(tx.conn())
        .await?;
        if offered.is_none() {
            return Ok(BulkAssignment::NotOffered);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_courses (user_id, course_id)
            SELECT id, $2 FROM users WHERE organization_id = $1 AND role = 'employee'
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(organization_id)
        .bind(course_id)
        .execute(tx.conn())
        .await?;

        tx.commit().await?;
        Ok(BulkAssignment::Assigned(result.rows_affected()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_courses", db.operation = "insert"))]
    async fn assign_course_to_employee(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<EmployeeAssignment, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        // lock the organization edge so a concurrent unassign cannot interleave
        let offered: Option<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM organization_courses WHERE organization_id = $1 AND course_id = $2 FOR SHARE",
        )
        .bind(organization_id)
        .bind(course_id)
        .fetch_optional(tx.conn())
        .await?;
        if offered.is_none() {
            return Ok(EmployeeAssignment::NotOffered);
        }

        let inserted = sqlx::query(
            "INSERT INTO user_courses (user_id, course_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(employee_id)
        .bind(course_id)
        .execute(tx.conn())
        .await?;

        tx.commit().await?;

        if inserted.rows_affected() == 0 {
            Ok(EmployeeAssignment::AlreadyAssigned)
        } else {
            Ok(EmployeeAssignment::Assigned)
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_courses", db.operation = "delete"))]
    async fn remove_employee_course(
        &self,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_courses WHERE user_id = $1 AND course_id = $2")
            .bind(employee_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_courses", db.operation = "select"))]
    async fn list_course_assignees(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT u.id, u.username, u.email, u.role, u.designation, u.organization_id, u.created_at
            FROM users u
            JOIN user_courses uc ON uc.user_id = u.id
            WHERE u.organization_id = $1 AND uc.course_id = $2
            ORDER BY u.username
            "#,
        )
        .bind(organization_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
