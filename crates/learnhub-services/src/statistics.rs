//! Reporting
//!
//! Read-only projections of progress and enrollment state. Admins see system-wide
//! figures; portal admins see their organization, where an enrollment is a progress
//! record of one of its employees on one of its offered courses.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use learnhub_core::constants::{
    MONTHLY_HISTOGRAM_MONTHS, RECENT_ORGANIZATIONS_LIMIT, RECENT_WINDOW_DAYS, TOP_COURSES_LIMIT,
};
use learnhub_core::models::{
    AtRiskEmployee, CourseBreakdown, CourseProgress, EmployeeBreakdown, MonthlyCount,
    OrganizationProgressReport, OrganizationStatistics, ProgressOverview, RiskCourse,
    SetRiskScoreRequest, Statistics, SystemStatistics, User, UserRole,
};
use learnhub_core::stats::{average, month_windows, percentage, truncated_percentage};
use learnhub_core::{Actor, AppError};
use learnhub_db::{
    AssignmentRepository, CatalogRepository, DirectoryRepository, EnrollmentScope,
    ProgressRepository, Repositories, StatisticsRepository,
};
use uuid::Uuid;

use crate::found;

/// An organization's employees, offered courses and the enrollments between them
struct Enrollments {
    employees: Vec<User>,
    course_ids: Vec<Uuid>,
    rows: Vec<CourseProgress>,
}

#[derive(Clone)]
pub struct StatisticsService {
    directory: Arc<dyn DirectoryRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    catalog: Arc<dyn CatalogRepository>,
    progress: Arc<dyn ProgressRepository>,
    statistics: Arc<dyn StatisticsRepository>,
}

impl StatisticsService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            directory: repos.directory.clone(),
            assignments: repos.assignments.clone(),
            catalog: repos.catalog.clone(),
            progress: repos.progress.clone(),
            statistics: repos.statistics.clone(),
        }
    }

    /// Role-appropriate statistics for the caller
    pub async fn statistics(&self, actor: &Actor) -> Result<Statistics, AppError> {
        match actor.role {
            UserRole::Admin => Ok(Statistics::System(self.system_statistics().await?)),
            UserRole::PortalAdmin => {
                let organization_id = actor.require_portal_admin()?;
                Ok(Statistics::Organization(
                    self.organization_statistics(organization_id).await?,
                ))
            }
            UserRole::Employee => Err(AppError::Forbidden(
                "Statistics are available to administrators only".to_string(),
            )),
        }
    }

    async fn system_statistics(&self) -> Result<SystemStatistics, AppError> {
        let now = Utc::now();
        let counts = self
            .statistics
            .system_counts(now - Duration::days(RECENT_WINDOW_DAYS))
            .await?;

        let mut monthly_user_growth = Vec::with_capacity(MONTHLY_HISTOGRAM_MONTHS as usize);
        for window in month_windows(now, MONTHLY_HISTOGRAM_MONTHS) {
            let count = self
                .statistics
                .count_users_created_between(window.start, window.end)
                .await?;
            monthly_user_growth.push(MonthlyCount {
                month: window.label,
                year: window.year,
                count,
            });
        }

        let mut recent_organizations = self.directory.list_organizations().await?;
        recent_organizations.truncate(RECENT_ORGANIZATIONS_LIMIT as usize);

        let top_courses = self
            .statistics
            .top_courses(EnrollmentScope::System, TOP_COURSES_LIMIT)
            .await?;

        Ok(SystemStatistics {
            total_courses: counts.total_courses,
            total_users: counts.total_users,
            total_organizations: counts.total_organizations,
            active_organizations: counts.active_organizations,
            inactive_organizations: counts.total_organizations - counts.active_organizations,
            total_portal_admins: counts.total_portal_admins,
            total_employees: counts.total_employees,
            recent_users: counts.recent_users,
            recent_courses: counts.recent_courses,
            monthly_user_growth,
            recent_organizations,
            top_courses,
        })
    }

    async fn enrollments(&self, organization_id: Uuid) -> Result<Enrollments, AppError> {
        let employees = self.directory.list_employees(organization_id).await?;
        let course_ids = self
            .assignments
            .organization_course_ids(organization_id)
            .await?;

        let offered: HashSet<Uuid> = course_ids.iter().copied().collect();
        let employee_ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
        let rows = self
            .progress
            .list_progress_for_users(&employee_ids)
            .await?
            .into_iter()
            .filter(|p| offered.contains(&p.course_id))
            .collect();

        Ok(Enrollments {
            employees,
            course_ids,
            rows,
        })
    }

    async fn organization_statistics(
        &self,
        organization_id: Uuid,
    ) -> Result<OrganizationStatistics, AppError> {
        let enrollments = self.enrollments(organization_id).await?;

        let active_courses = enrollments
            .rows
            .iter()
            .map(|p| p.course_id)
            .collect::<HashSet<_>>()
            .len() as i64;
        let fully_completed = enrollments
            .rows
            .iter()
            .filter(|p| p.progress_percentage == 100.0)
            .count() as i64;

        let top_courses = self
            .statistics
            .top_courses(EnrollmentScope::Organization(organization_id), TOP_COURSES_LIMIT)
            .await?;

        Ok(OrganizationStatistics {
            organization_id,
            employee_count: enrollments.employees.len() as i64,
            total_courses: enrollments.course_ids.len() as i64,
            active_courses,
            completion_rate: truncated_percentage(fully_completed, enrollments.rows.len() as i64),
            top_courses,
        })
    }

    /// Completion, progress and risk broken down per course and per employee
    pub async fn organization_report(
        &self,
        actor: &Actor,
        organization_id: Uuid,
    ) -> Result<OrganizationProgressReport, AppError> {
        actor.require_organization_manager(organization_id)?;
        found(
            self.directory.get_organization(organization_id).await?,
            "Organization",
        )?;

        let enrollments = self.enrollments(organization_id).await?;

        let mut titles: HashMap<Uuid, String> = HashMap::new();
        for course_id in &enrollments.course_ids {
            if let Some(course) = self.catalog.get_course(*course_id).await? {
                titles.insert(course.id, course.title);
            }
        }

        let mut course_statistics: Vec<CourseBreakdown> = enrollments
            .course_ids
            .iter()
            .filter_map(|course_id| {
                let title = titles.get(course_id)?.clone();
                let rows: Vec<&CourseProgress> = enrollments
                    .rows
                    .iter()
                    .filter(|p| p.course_id == *course_id)
                    .collect();
                let enrolled = rows.len() as i64;
                let completed = rows.iter().filter(|p| p.is_completed()).count() as i64;

                Some(CourseBreakdown {
                    course_id: *course_id,
                    title,
                    enrolled,
                    completed,
                    avg_progress: average(rows.iter().map(|p| p.progress_percentage)),
                    at_risk: rows.iter().filter(|p| p.is_at_risk()).count() as i64,
                    completion_rate: percentage(completed, enrolled),
                })
            })
            .collect();
        course_statistics.sort_by(|a, b| a.title.cmp(&b.title).then(a.course_id.cmp(&b.course_id)));

        let mut employee_statistics = Vec::with_capacity(enrollments.employees.len());
        let mut employees_at_risk = Vec::new();
        for employee in &enrollments.employees {
            let rows: Vec<&CourseProgress> = enrollments
                .rows
                .iter()
                .filter(|p| p.user_id == employee.id)
                .collect();
            let risk_courses: Vec<RiskCourse> = rows
                .iter()
                .filter(|p| p.is_at_risk())
                .map(|p| RiskCourse {
                    course_id: p.course_id,
                    title: titles.get(&p.course_id).cloned().unwrap_or_default(),
                    risk_score: p.risk_score,
                    progress_percentage: p.progress_percentage,
                })
                .collect();
            let assigned_courses = self.assignments.user_course_ids(employee.id).await?.len() as i64;

            employee_statistics.push(EmployeeBreakdown {
                employee_id: employee.id,
                username: employee.username.clone(),
                assigned_courses,
                completed: rows.iter().filter(|p| p.is_completed()).count() as i64,
                avg_progress: average(rows.iter().map(|p| p.progress_percentage)),
                high_risk: risk_courses.len() as i64,
            });
            if !risk_courses.is_empty() {
                employees_at_risk.push(AtRiskEmployee {
                    employee_id: employee.id,
                    username: employee.username.clone(),
                    risk_courses,
                });
            }
        }

        let completed = enrollments.rows.iter().filter(|p| p.is_completed()).count() as i64;
        let in_progress = enrollments
            .rows
            .iter()
            .filter(|p| !p.is_completed() && p.progress_percentage > 0.0)
            .count() as i64;
        let not_started = enrollments
            .rows
            .iter()
            .filter(|p| !p.is_completed() && p.progress_percentage <= 0.0)
            .count() as i64;

        Ok(OrganizationProgressReport {
            organization_id,
            total_employees: enrollments.employees.len() as i64,
            total_courses: enrollments.course_ids.len() as i64,
            overall_completion_rate: percentage(completed, enrollments.rows.len() as i64),
            employees_at_risk_count: employees_at_risk.len() as i64,
            overview: ProgressOverview {
                completed,
                in_progress,
                not_started,
                avg_progress: average(enrollments.rows.iter().map(|p| p.progress_percentage)),
            },
            course_statistics,
            employee_statistics,
            employees_at_risk,
        })
    }

    /// Record an externally assessed risk score on an existing progress record.
    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn set_risk_score(
        &self,
        actor: &Actor,
        user_id: Uuid,
        course_id: Uuid,
        request: SetRiskScoreRequest,
    ) -> Result<CourseProgress, AppError> {
        if !(0..=100).contains(&request.risk_score) {
            return Err(AppError::InvalidInput(
                "Risk score must be between 0 and 100".to_string(),
            ));
        }
        let user = found(self.directory.get_user(user_id).await?, "User")?;
        let organization_id = user
            .organization_id
            .ok_or_else(|| AppError::NotFound("User has no organization".to_string()))?;
        actor.require_organization_manager(organization_id)?;

        let progress = self
            .progress
            .set_risk_score(user_id, course_id, request.risk_score)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No progress recorded for this course".to_string())
            })?;

        tracing::info!(user_id = %user_id, course_id = %course_id, risk_score = request.risk_score, "Risk score updated");
        Ok(progress)
    }
}
