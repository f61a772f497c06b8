use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl Display for CourseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CourseStatus::Draft => write!(f, "draft"),
            CourseStatus::Published => write!(f, "published"),
            CourseStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for CourseStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "archived" => Ok(CourseStatus::Archived),
            _ => Err(anyhow::anyhow!(
                "Invalid course status: {}. Must be one of: draft, published, archived",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Pdf,
    Quiz,
}

impl ContentType {
    /// Video and PDF content point at an uploaded file; quizzes are built from questions.
    pub fn requires_file(&self) -> bool {
        matches!(self, ContentType::Video | ContentType::Pdf)
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContentType::Video => write!(f, "video"),
            ContentType::Pdf => write!(f, "pdf"),
            ContentType::Quiz => write!(f, "quiz"),
        }
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "pdf" => Ok(ContentType::Pdf),
            "quiz" => Ok(ContentType::Quiz),
            _ => Err(anyhow::anyhow!(
                "Invalid content type: {}. Must be one of: video, pdf, quiz",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ModuleContent {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub content_type: ContentType,
    pub file_path: Option<String>,
    pub body: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// A content item together with the course it belongs to
#[derive(Debug, Clone)]
pub struct ContentLocation {
    pub content: ModuleContent,
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub module_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: Module,
    pub contents: Vec<ModuleContent>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleDetail>,
}

/// Insert payload for a content row, validated by the catalog service
#[derive(Debug, Clone)]
pub struct NewContent {
    pub module_id: Uuid,
    pub title: String,
    pub content_type: ContentType,
    pub file_path: Option<String>,
    pub body: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Course title must be between 1 and 120 characters"
    ))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Module title must be between 1 and 120 characters"
    ))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit order; defaults to one past the current maximum
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateContentRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Content title must be between 1 and 120 characters"
    ))]
    pub title: String,
    pub content_type: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub file_path: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}
