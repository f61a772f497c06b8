use chrono::{DateTime, Utc};
use learnhub_core::models::{
    CompletionTarget, ContentInteraction, CourseProgress, Interaction, ModuleCompletionOutcome,
    ModuleProgressMap, RecordedInteraction,
};
use learnhub_core::AppError;
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::db::traits::ProgressRepository;
use crate::db::transaction::TransactionGuard;

const PROGRESS_COLUMNS: &str = "id, user_id, course_id, completed_modules, total_modules, \
     progress_percentage, module_progress, last_activity, completion_date, risk_score, created_at";

#[derive(sqlx::FromRow)]
struct CourseProgressRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    completed_modules: i32,
    total_modules: i32,
    progress_percentage: f64,
    module_progress: serde_json::Value,
    last_activity: DateTime<Utc>,
    completion_date: Option<DateTime<Utc>>,
    risk_score: i32,
    created_at: DateTime<Utc>,
}

impl From<CourseProgressRow> for CourseProgress {
    fn from(row: CourseProgressRow) -> Self {
        CourseProgress {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            completed_modules: row.completed_modules,
            total_modules: row.total_modules,
            progress_percentage: row.progress_percentage,
            module_progress: ModuleProgressMap::from_stored(row.module_progress),
            last_activity: row.last_activity,
            completion_date: row.completion_date,
            risk_score: row.risk_score,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_progress(
    conn: &mut PgConnection,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Option<CourseProgress>, AppError> {
    let row = sqlx::query_as::<Postgres, CourseProgressRow>(&format!(
        "SELECT {} FROM course_progress WHERE user_id = $1 AND course_id = $2 FOR UPDATE",
        PROGRESS_COLUMNS
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(CourseProgress::from))
}

async fn upsert_interaction(
    conn: &mut PgConnection,
    user_id: Uuid,
    content_id: Uuid,
    interaction: &Interaction,
    now: DateTime<Utc>,
) -> Result<ContentInteraction, AppError> {
    let stored = sqlx::query_as::<Postgres, ContentInteraction>(
        r#"
        INSERT INTO content_interactions
            (id, user_id, content_id, interaction_type, interaction_data, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        ON CONFLICT (user_id, content_id) DO UPDATE
        SET interaction_type = EXCLUDED.interaction_type,
            interaction_data = EXCLUDED.interaction_data,
            updated_at = EXCLUDED.updated_at
        RETURNING id, user_id, content_id, interaction_type, interaction_data, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(content_id)
    .bind(interaction.interaction_type())
    .bind(interaction.to_data())
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(stored)
}

async fn complete_module(
    conn: &mut PgConnection,
    user_id: Uuid,
    target: CompletionTarget,
    now: DateTime<Utc>,
) -> Result<ModuleCompletionOutcome, AppError> {
    let course_id = target.course_id;
    let existing = lock_progress(&mut *conn, user_id, course_id).await?;
    let mut progress = match existing {
        Some(progress) => progress,
        None => {
            let total_modules: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM modules WHERE course_id = $1")
                    .bind(course_id)
                    .fetch_one(&mut *conn)
                    .await?;
            let fresh = CourseProgress::new(user_id, course_id, total_modules as i32, now);

            // a concurrent first event may insert the row first; lock whichever row won
            sqlx::query(
                r#"
                INSERT INTO course_progress
                    (id, user_id, course_id, total_modules, last_activity, created_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                ON CONFLICT (user_id, course_id) DO NOTHING
                "#,
            )
            .bind(fresh.id)
            .bind(user_id)
            .bind(course_id)
            .bind(fresh.total_modules)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            lock_progress(&mut *conn, user_id, course_id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal("Progress record vanished after insert".to_string())
                })?
        }
    };

    let newly_completed = progress.record_module_completion(target.module_id, now);
    if newly_completed {
        sqlx::query(
            r#"
            UPDATE course_progress
            SET completed_modules = $2,
                progress_percentage = $3,
                module_progress = $4,
                last_activity = $5,
                completion_date = $6,
                risk_score = $7
            WHERE id = $1
            "#,
        )
        .bind(progress.id)
        .bind(progress.completed_modules)
        .bind(progress.progress_percentage)
        .bind(progress.module_progress.to_stored())
        .bind(progress.last_activity)
        .bind(progress.completion_date)
        .bind(progress.risk_score)
        .execute(&mut *conn)
        .await?;
    }

    Ok(ModuleCompletionOutcome {
        newly_completed,
        progress,
    })
}

#[async_trait::async_trait]
impl ProgressRepository for PostgresProgressRepository {
    #[tracing::instrument(skip(self, interaction), fields(db.table = "content_interactions", db.operation = "upsert"))]
    async fn record_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction: &Interaction,
        completion: Option<CompletionTarget>,
        now: DateTime<Utc>,
    ) -> Result<RecordedInteraction, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let stored = upsert_interaction(tx.conn(), user_id, content_id, interaction, now).await?;
        let completion = match completion {
            Some(target) => Some(complete_module(tx.conn(), user_id, target, now).await?),
            None => None,
        };

        tx.commit().await?;
        Ok(RecordedInteraction {
            interaction: stored,
            completion,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_interactions", db.operation = "select"))]
    async fn get_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentInteraction>, AppError> {
        let interaction = sqlx::query_as::<Postgres, ContentInteraction>(
            r#"
            SELECT id, user_id, content_id, interaction_type, interaction_data, updated_at
            FROM content_interactions
            WHERE user_id = $1 AND content_id = $2
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(interaction)
    }

    #[tracing::instrument(skip(self), fields(db.table = "course_progress", db.operation = "select"))]
    async fn get_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseProgress>, AppError> {
        let row = sqlx::query_as::<Postgres, CourseProgressRow>(&format!(
            "SELECT {} FROM course_progress WHERE user_id = $1 AND course_id = $2",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CourseProgress::from))
    }

    #[tracing::instrument(skip(self, user_ids), fields(db.table = "course_progress", db.operation = "select", user_count = user_ids.len()))]
    async fn list_progress_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<CourseProgress>, AppError> {
        let rows = sqlx::query_as::<Postgres, CourseProgressRow>(&format!(
            "SELECT {} FROM course_progress WHERE user_id = ANY($1) ORDER BY created_at, id",
            PROGRESS_COLUMNS
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CourseProgress::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "course_progress", db.operation = "update"))]
    async fn set_risk_score(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        risk_score: i32,
    ) -> Result<Option<CourseProgress>, AppError> {
        let row = sqlx::query_as::<Postgres, CourseProgressRow>(&format!(
            "UPDATE course_progress SET risk_score = $3 WHERE user_id = $1 AND course_id = $2 RETURNING {}",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(course_id)
        .bind(risk_score)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CourseProgress::from))
    }
}
