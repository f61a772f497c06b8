use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Organization;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyCount {
    pub month: String,
    pub year: i32,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopCourse {
    pub id: Uuid,
    pub title: String,
    pub enrollments: i64,
}

/// Raw counters read from the store for the system-wide view
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SystemCounts {
    pub total_courses: i64,
    pub total_users: i64,
    pub total_organizations: i64,
    pub active_organizations: i64,
    pub total_portal_admins: i64,
    pub total_employees: i64,
    pub recent_users: i64,
    pub recent_courses: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemStatistics {
    pub total_courses: i64,
    pub total_users: i64,
    pub total_organizations: i64,
    pub active_organizations: i64,
    pub inactive_organizations: i64,
    pub total_portal_admins: i64,
    pub total_employees: i64,
    pub recent_users: i64,
    pub recent_courses: i64,
    pub monthly_user_growth: Vec<MonthlyCount>,
    pub recent_organizations: Vec<Organization>,
    pub top_courses: Vec<TopCourse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationStatistics {
    pub organization_id: Uuid,
    pub employee_count: i64,
    pub total_courses: i64,
    pub active_courses: i64,
    /// Whole-number percentage of enrollments at exactly 100% progress
    pub completion_rate: i64,
    pub top_courses: Vec<TopCourse>,
}

/// Role-appropriate statistics for the caller
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Statistics {
    System(SystemStatistics),
    Organization(OrganizationStatistics),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CourseBreakdown {
    pub course_id: Uuid,
    pub title: String,
    pub enrolled: i64,
    pub completed: i64,
    pub avg_progress: f64,
    pub at_risk: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeBreakdown {
    pub employee_id: Uuid,
    pub username: String,
    pub assigned_courses: i64,
    pub completed: i64,
    pub avg_progress: f64,
    pub high_risk: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RiskCourse {
    pub course_id: Uuid,
    pub title: String,
    pub risk_score: i32,
    pub progress_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AtRiskEmployee {
    pub employee_id: Uuid,
    pub username: String,
    pub risk_courses: Vec<RiskCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProgressOverview {
    pub completed: i64,
    pub in_progress: i64,
    pub not_started: i64,
    pub avg_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrganizationProgressReport {
    pub organization_id: Uuid,
    pub total_employees: i64,
    pub total_courses: i64,
    pub overall_completion_rate: f64,
    pub employees_at_risk_count: i64,
    pub overview: ProgressOverview,
    pub course_statistics: Vec<CourseBreakdown>,
    pub employee_statistics: Vec<EmployeeBreakdown>,
    pub employees_at_risk: Vec<AtRiskEmployee>,
}
