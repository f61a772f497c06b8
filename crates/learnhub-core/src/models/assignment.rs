use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    Course, CourseDetail, ModuleContent, ModuleProgressMap, ProgressSnapshot, User,
};

/// Response for assignment mutations: a success flag, a message and the counts touched
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentResult {
    pub success: bool,
    pub message: String,
    pub course_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Uuid>,
    pub employees_updated: u64,
}

/// Result of replacing an organization's course set
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSetReplacement {
    pub organization_id: Uuid,
    pub assigned_course_ids: Vec<Uuid>,
    pub employees_updated: u64,
}

/// Outcome of assigning a course to a single employee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeAssignment {
    Assigned,
    AlreadyAssigned,
    NotOffered,
}

/// Outcome of pushing a course to every employee of an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAssignment {
    /// Employees newly given the course
    Assigned(u64),
    NotOffered,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignCourseRequest {
    pub course_id: Uuid,
}

/// Availability of a published course from an organization's point of view
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseAvailability {
    Assigned,
    Pending,
    Available,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortalCourse {
    #[serde(flatten)]
    pub course: Course,
    pub module_count: i64,
    pub course_status: CourseAvailability,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseAssignees {
    pub course_id: Uuid,
    pub employees: Vec<User>,
}

/// A course as listed to the employee taking it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledCourse {
    #[serde(flatten)]
    pub course: Course,
    pub module_count: i64,
    pub progress_percentage: Option<f64>,
    pub completed_modules: Option<i32>,
    pub is_completed: bool,
}

/// One content item as opened by the employee taking its course
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeContentView {
    #[serde(flatten)]
    pub content: ModuleContent,
    pub course_id: Uuid,
    /// Only set for quiz items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<usize>,
}

/// Course structure plus the caller's per-module completion state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeCourseDetail {
    #[serde(flatten)]
    pub detail: CourseDetail,
    pub progress: Option<ProgressSnapshot>,
    #[schema(value_type = Object)]
    pub module_progress: ModuleProgressMap,
}
