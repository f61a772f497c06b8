//! Repository traits
//!
//! One trait per aggregate. Implementations must make every method atomic; outcome
//! enums are decided against the state seen inside that atomic step.

use chrono::{DateTime, Utc};
use learnhub_core::models::{
    BulkAssignment, CompletionTarget, ContentInteraction, ContentLocation, Course, CourseProgress, CourseRequest,
    CourseSetReplacement, CourseStatus, CourseSummary, CreateRequestOutcome, EmployeeAssignment,
    Interaction, Module, ModuleContent, NewContent, NewCourseRequest, NewOrganization,
    NewQuestion, NewUser, Organization, OrganizationDeletion, OrganizationStatus,
    QuestionWithOptions, QuizOptionInput, QuizQuestion, RecordedInteraction, RequestResolution,
    ResolveRequestOutcome, SystemCounts, TopCourse, User, UserRole,
};
use learnhub_core::AppError;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a user. When the user is an employee, they are enrolled in the
    /// organization's current course set in the same step.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn list_employees(&self, organization_id: Uuid) -> Result<Vec<User>, AppError>;

    /// Every user, or only those holding `role`, oldest first
    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError>;

    /// Remove a user with their course links, progress and interactions.
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError>;

    async fn create_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<(Organization, User), AppError>;

    async fn get_organization(&self, organization_id: Uuid)
        -> Result<Option<Organization>, AppError>;

    /// All organizations, newest first
    async fn list_organizations(&self) -> Result<Vec<Organization>, AppError>;

    async fn update_organization_status(
        &self,
        organization_id: Uuid,
        status: OrganizationStatus,
    ) -> Result<Option<Organization>, AppError>;

    /// Cascade: employee course links, course requests, organization course links,
    /// users, then the organization itself.
    async fn delete_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationDeletion>, AppError>;
}

/// Organization↔course and employee↔course edges
#[async_trait::async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn organization_course_ids(&self, organization_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn user_course_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Replace the organization's set and rebuild every employee's set to match it.
    async fn replace_organization_courses(
        &self,
        organization_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<CourseSetReplacement, AppError>;

    /// Append one course to the organization only. Returns false if already present.
    async fn add_organization_course(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Remove the course from the organization and every employee holding it.
    /// Returns the number of employees updated, or None if the organization did
    /// not have the course.
    async fn remove_organization_course(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<u64>, AppError>;

    /// Give the course to every employee lacking it, provided the organization
    /// offers it at that moment.
    async fn assign_course_to_all_employees(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<BulkAssignment, AppError>;

    async fn assign_course_to_employee(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<EmployeeAssignment, AppError>;

    async fn remove_employee_course(&self, employee_id: Uuid, course_id: Uuid)
        -> Result<bool, AppError>;

    async fn list_course_assignees(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<User>, AppError>;
}

/// Filter for listing course requests; `None` fields match everything
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFilter {
    pub organization_id: Option<Uuid>,
    pub requested_by: Option<Uuid>,
}

#[async_trait::async_trait]
pub trait CourseRequestRepository: Send + Sync {
    async fn create_request(&self, request: NewCourseRequest)
        -> Result<CreateRequestOutcome, AppError>;

    /// Matching requests, newest first
    async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<CourseRequest>, AppError>;

    async fn pending_course_ids(&self, organization_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Resolve a pending request. Approval appends the course to the organization
    /// when absent, within the same step.
    async fn resolve_request(
        &self,
        resolution: RequestResolution,
    ) -> Result<ResolveRequestOutcome, AppError>;
}

#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_course(
        &self,
        title: &str,
        description: Option<&str>,
        status: CourseStatus,
    ) -> Result<Course, AppError>;

    async fn get_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError>;

    /// Courses with module counts, newest first, optionally restricted to one status
    async fn list_courses(&self, status: Option<CourseStatus>)
        -> Result<Vec<CourseSummary>, AppError>;

    /// Remove a course with its structure, progress, interactions, requests and links.
    async fn delete_course(&self, course_id: Uuid) -> Result<bool, AppError>;

    /// Insert a module; position defaults to one past the current maximum.
    async fn create_module(
        &self,
        course_id: Uuid,
        title: &str,
        description: Option<&str>,
        position: Option<i32>,
    ) -> Result<Module, AppError>;

    async fn get_module(&self, module_id: Uuid) -> Result<Option<Module>, AppError>;

    async fn list_modules(&self, course_id: Uuid) -> Result<Vec<Module>, AppError>;

    async fn count_modules(&self, course_id: Uuid) -> Result<i64, AppError>;

    /// Insert a content item; position defaults to one past the current maximum.
    async fn create_content(&self, content: NewContent) -> Result<ModuleContent, AppError>;

    /// All content of a course, ordered by module position then content position
    async fn list_course_contents(&self, course_id: Uuid) -> Result<Vec<ModuleContent>, AppError>;

    async fn get_content_location(&self, content_id: Uuid)
        -> Result<Option<ContentLocation>, AppError>;

    async fn create_question(&self, question: NewQuestion) -> Result<QuestionWithOptions, AppError>;

    async fn get_question(&self, question_id: Uuid) -> Result<Option<QuizQuestion>, AppError>;

    /// Swap the full option set of a question in one step.
    async fn replace_question_options(
        &self,
        question_id: Uuid,
        options: &[QuizOptionInput],
    ) -> Result<Option<QuestionWithOptions>, AppError>;

    async fn list_questions(&self, content_id: Uuid) -> Result<Vec<QuestionWithOptions>, AppError>;
}

#[async_trait::async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Store the interaction, overwriting any earlier one for (user, content), and
    /// check-and-mark `completion` in the same atomic step. The progress record is
    /// created on first use; concurrent calls for one module increment at most once.
    async fn record_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction: &Interaction,
        completion: Option<CompletionTarget>,
        now: DateTime<Utc>,
    ) -> Result<RecordedInteraction, AppError>;

    async fn get_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentInteraction>, AppError>;

    async fn get_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseProgress>, AppError>;

    async fn list_progress_for_users(&self, user_ids: &[Uuid])
        -> Result<Vec<CourseProgress>, AppError>;

    async fn set_risk_score(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        risk_score: i32,
    ) -> Result<Option<CourseProgress>, AppError>;
}

/// Which progress rows count as enrollments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentScope {
    System,
    /// Rows of the organization's employees on the organization's courses
    Organization(Uuid),
}

#[async_trait::async_trait]
pub trait StatisticsRepository: Send + Sync {
    async fn system_counts(&self, recent_since: DateTime<Utc>) -> Result<SystemCounts, AppError>;

    async fn count_users_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Courses ranked by enrollment count, ties by title then id
    async fn top_courses(&self, scope: EnrollmentScope, limit: i64)
        -> Result<Vec<TopCourse>, AppError>;
}
