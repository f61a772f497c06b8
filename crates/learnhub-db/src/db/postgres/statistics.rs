use chrono::{DateTime, Utc};
use learnhub_core::models::{SystemCounts, TopCourse};
use learnhub_core::AppError;
use sqlx::{PgPool, Postgres};

use crate::db::traits::{EnrollmentScope, StatisticsRepository};

#[derive(Clone)]
pub struct PostgresStatisticsRepository {
    pool: PgPool,
}

impl PostgresStatisticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StatisticsRepository for PostgresStatisticsRepository {
    #[tracing::instrument(skip(self), fields(db.operation = "aggregate"))]
    async fn system_counts(&self, recent_since: DateTime<Utc>) -> Result<SystemCounts, AppError> {
        let counts = sqlx::query_as::<Postgres, SystemCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM organizations) AS total_organizations,
                (SELECT COUNT(*) FROM organizations WHERE status = 'active') AS active_organizations,
                (SELECT COUNT(*) FROM users WHERE role = 'portal_admin') AS total_portal_admins,
                (SELECT COUNT(*) FROM users WHERE role = 'employee') AS total_employees,
                (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS recent_users,
                (SELECT COUNT(*) FROM courses WHERE created_at >= $1) AS recent_courses
            "#,
        )
        .bind(recent_since)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "count"))]
    async fn count_users_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "course_progress", db.operation = "aggregate"))]
    async fn top_courses(
        &self,
        scope: EnrollmentScope,
        limit: i64,
    ) -> Result<Vec<TopCourse>, AppError> {
        let courses = match scope {
            EnrollmentScope::System => {
                sqlx::query_as::<Postgres, TopCourse>(
                    r#"
                    SELECT c.id, c.title, COUNT(cp.id) AS enrollments
                    FROM courses c
                    JOIN course_progress cp ON cp.course_id = c.id
                    GROUP BY c.id, c.title
                    ORDER BY enrollments DESC, c.title, c.id
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            EnrollmentScope::Organization(organization_id) => {
                sqlx::query_as::<Postgres, TopCourse>(
                    r#"
                    SELECT c.id, c.title, COUNT(cp.id) AS enrollments
                    FROM courses c
                    JOIN organization_courses oc
                        ON oc.course_id = c.id AND oc.organization_id = $1
                    JOIN course_progress cp ON cp.course_id = c.id
                    JOIN users u ON u.id = cp.user_id AND u.organization_id = $1
                    GROUP BY c.id, c.title
                    ORDER BY enrollments DESC, c.title, c.id
                    LIMIT $2
                    "#,
                )
                .bind(organization_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(courses)
    }
}
