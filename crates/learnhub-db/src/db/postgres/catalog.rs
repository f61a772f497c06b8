use std::collections::HashMap;

use learnhub_core::models::{
    ContentLocation, Course, CourseStatus, CourseSummary, Module, ModuleContent, NewContent,
    NewQuestion, QuestionWithOptions, QuizOption, QuizOptionInput, QuizQuestion,
};
use learnhub_core::AppError;
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::db::traits::CatalogRepository;
use crate::db::transaction::TransactionGuard;

const COURSE_COLUMNS: &str = "id, title, description, status, created_at";
const MODULE_COLUMNS: &str = "id, course_id, title, description, position, created_at";
const CONTENT_COLUMNS: &str =
    "id, module_id, title, content_type, file_path, body, position, created_at";

#[derive(sqlx::FromRow)]
struct CourseSummaryRow {
    #[sqlx(flatten)]
    course: Course,
    module_count: i64,
}

#[derive(sqlx::FromRow)]
struct ContentLocationRow {
    #[sqlx(flatten)]
    content: ModuleContent,
    course_id: Uuid,
}

#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_options(
    conn: &mut PgConnection,
    question_id: Uuid,
    options: &[QuizOptionInput],
) -> Result<Vec<QuizOption>, AppError> {
    let mut inserted = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let row = sqlx::query_as::<Postgres, QuizOption>(
            r#"
            INSERT INTO quiz_options (id, question_id, option_text, is_correct, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, question_id, option_text, is_correct
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(option.option_text.trim())
        .bind(option.is_correct)
        .bind(index as i32 + 1)
        .fetch_one(&mut *conn)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

#[async_trait::async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    #[tracing::instrument(skip(self, description), fields(db.table = "courses", db.operation = "insert"))]
    async fn create_course(
        &self,
        title: &str,
        description: Option<&str>,
        status: CourseStatus,
    ) -> Result<Course, AppError> {
        let course = sqlx::query_as::<Postgres, Course>(&format!(
            "INSERT INTO courses (id, title, description, status) VALUES ($1, $2, $3, $4) RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    #[tracing::instrument(skip(self), fields(db.table = "courses", db.operation = "select"))]
    async fn get_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError> {
        let course = sqlx::query_as::<Postgres, Course>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    #[tracing::instrument(skip(self), fields(db.table = "courses", db.operation = "select"))]
    async fn list_courses(
        &self,
        status: Option<CourseStatus>,
    ) -> Result<Vec<CourseSummary>, AppError> {
        let rows = sqlx::query_as::<Postgres, CourseSummaryRow>(
            r#"
            SELECT c.id, c.title, c.description, c.status, c.created_at,
                   COUNT(m.id) AS module_count
            FROM courses c
            LEFT JOIN modules m ON m.course_id = c.id
            WHERE ($1::text IS NULL OR c.status = $1)
            GROUP BY c.id
            ORDER BY c.created_at DESC, c.id
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CourseSummary {
                course: r.course,
                module_count: r.module_count,
            })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "courses", db.operation = "delete"))]
    async fn delete_course(&self, course_id: Uuid) -> Result<bool, AppError> {
        // structure, progress, interactions, requests and both edges cascade
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, title, description), fields(db.table = "modules", db.operation = "insert"))]
    async fn create_module(
        &self,
        course_id: Uuid,
        title: &str,
        description: Option<&str>,
        position: Option<i32>,
    ) -> Result<Module, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        // serialize default-position assignment per course
        sqlx::query("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
            .bind(course_id)
            .execute(tx.conn())
            .await?;

        let module = sqlx::query_as::<Postgres, Module>(&format!(
            r#"
            INSERT INTO modules (id, course_id, title, description, position)
            VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (SELECT COALESCE(MAX(position), 0) + 1 FROM modules WHERE course_id = $2))
            )
            RETURNING {}
            "#,
            MODULE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(title)
        .bind(description)
        .bind(position)
        .fetch_one(tx.conn())
        .await?;

        tx.commit().await?;
        Ok(module)
    }

    #[tracing::instrument(skip(self), fields(db.table = "modules", db.operation = "select"))]
    async fn get_module(&self, module_id: Uuid) -> Result<Option<Module>, AppError> {
        let module = sqlx::query_as::<Postgres, Module>(&format!(
            "SELECT {} FROM modules WHERE id = $1",
            MODULE_COLUMNS
        ))
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }

    #[tracing::instrument(skip(self), fields(db.table = "modules", db.operation = "select"))]
    async fn list_modules(&self, course_id: Uuid) -> Result<Vec<Module>, AppError> {
        let modules = sqlx::query_as::<Postgres, Module>(&format!(
            "SELECT {} FROM modules WHERE course_id = $1 ORDER BY position, created_at",
            MODULE_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    #[tracing::instrument(skip(self), fields(db.table = "modules", db.operation = "count"))]
    async fn count_modules(&self, course_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "module_contents", db.operation = "insert", module_id = %content.module_id))]
    async fn create_content(&self, content: NewContent) -> Result<ModuleContent, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query("SELECT id FROM modules WHERE id = $1 FOR UPDATE")
            .bind(content.module_id)
            .execute(tx.conn())
            .await?;

        let created = sqlx::query_as::<Postgres, ModuleContent>(&format!(
            r#"
            INSERT INTO module_contents (id, module_id, title, content_type, file_path, body, position)
            VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, (SELECT COALESCE(MAX(position), 0) + 1 FROM module_contents WHERE module_id = $2))
            )
            RETURNING {}
            "#,
            CONTENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(content.module_id)
        .bind(&content.title)
        .bind(content.content_type)
        .bind(&content.file_path)
        .bind(&content.body)
        .bind(content.position)
        .fetch_one(tx.conn())
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "module_contents", db.operation = "select"))]
    async fn list_course_contents(&self, course_id: Uuid) -> Result<Vec<ModuleContent>, AppError> {
        let contents = sqlx::query_as::<Postgres, ModuleContent>(
            r#"
            SELECT mc.id, mc.module_id, mc.title, mc.content_type, mc.file_path, mc.body,
                   mc.position, mc.created_at
            FROM module_contents mc
            JOIN modules m ON m.id = mc.module_id
            WHERE m.course_id = $1
            ORDER BY m.position, m.created_at, mc.position, mc.created_at
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contents)
    }

    #[tracing::instrument(skip(self), fields(db.table = "module_contents", db.operation = "select"))]
    async fn get_content_location(
        &self,
        content_id: Uuid,
    ) -> Result<Option<ContentLocation>, AppError> {
        let row = sqlx::query_as::<Postgres, ContentLocationRow>(
            r#"
            SELECT mc.id, mc.module_id, mc.title, mc.content_type, mc.file_path, mc.body,
                   mc.position, mc.created_at, m.course_id
            FROM module_contents mc
            JOIN modules m ON m.id = mc.module_id
            WHERE mc.id = $1
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ContentLocation {
            content: r.content,
            course_id: r.course_id,
        }))
    }

    #[tracing::instrument(skip(self, question), fields(db.table = "quiz_questions", db.operation = "insert", content_id = %question.content_id))]
    async fn create_question(
        &self,
        question: NewQuestion,
    ) -> Result<QuestionWithOptions, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query("SELECT id FROM module_contents WHERE id = $1 FOR UPDATE")
            .bind(question.content_id)
            .execute(tx.conn())
            .await?;

        let created = sqlx::query_as::<Postgres, QuizQuestion>(
            r#"
            INSERT INTO quiz_questions (id, content_id, question_text, question_type, position)
            VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (SELECT COALESCE(MAX(position), 0) + 1 FROM quiz_questions WHERE content_id = $2))
            )
            RETURNING id, content_id, question_text, question_type, position
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question.content_id)
        .bind(&question.question_text)
        .bind(question.question_type)
        .bind(question.position)
        .fetch_one(tx.conn())
        .await?;

        let options = insert_options(tx.conn(), created.id, &question.options).await?;

        tx.commit().await?;
        Ok(QuestionWithOptions {
            question: created,
            options,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "quiz_questions", db.operation = "select"))]
    async fn get_question(&self, question_id: Uuid) -> Result<Option<QuizQuestion>, AppError> {
        let question = sqlx::query_as::<Postgres, QuizQuestion>(
            "SELECT id, content_id, question_text, question_type, position FROM quiz_questions WHERE id = $1",
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    #[tracing::instrument(skip(self, options), fields(db.table = "quiz_options", db.operation = "replace"))]
    async fn replace_question_options(
        &self,
        question_id: Uuid,
        options: &[QuizOptionInput],
    ) -> Result<Option<QuestionWithOptions>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let question = sqlx::query_as::<Postgres, QuizQuestion>(
            "SELECT id, content_id, question_text, question_type, position FROM quiz_questions WHERE id = $1 FOR UPDATE",
        )
        .bind(question_id)
        .fetch_optional(tx.conn())
        .await?;
        let Some(question) = question else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM quiz_options WHERE question_id = $1")
            .bind(question_id)
            .execute(tx.conn())
            .await?;

        let options = insert_options(tx.conn(), question_id, options).await?;

        tx.commit().await?;
        Ok(Some(QuestionWithOptions { question, options }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "quiz_questions", db.operation = "select"))]
    async fn list_questions(&self, content_id: Uuid) -> Result<Vec<QuestionWithOptions>, AppError> {
        let questions = sqlx::query_as::<Postgres, QuizQuestion>(
            r#"
            SELECT id, content_id, question_text, question_type, position
            FROM quiz_questions
            WHERE content_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        let question_ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let options = sqlx::query_as::<Postgres, QuizOption>(
            r#"
            SELECT id, question_id, option_text, is_correct
            FROM quiz_options
            WHERE question_id = ANY($1)
            ORDER BY position, id
            "#,
        )
        .bind(&question_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<Uuid, Vec<QuizOption>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }

        Ok(questions
            .into_iter()
            .map(|question| QuestionWithOptions {
                options: by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect())
    }
}
