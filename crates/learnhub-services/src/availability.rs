//! Course availability
//!
//! The only path that mutates the organization↔course and employee↔course edges.
//! Employees may only hold courses their organization currently offers: bulk
//! replacement rebuilds every employee set, a single-course append leaves employees
//! alone until the course is pushed explicitly, and removing a course from the
//! organization strips it from every employee in the same step.

use std::collections::HashSet;
use std::sync::Arc;

use learnhub_core::models::{
    AssignmentResult, BulkAssignment, CourseAssignees, CourseAvailability, CourseSetReplacement,
    CourseStatus, EmployeeAssignment, EnrolledCourse, PortalCourse, User, UserRole,
};
use learnhub_core::stats::course_price;
use learnhub_core::{Actor, AppError};
use learnhub_db::{
    AssignmentRepository, CatalogRepository, CourseRequestRepository, DirectoryRepository,
    ProgressRepository, Repositories,
};
use uuid::Uuid;

use crate::found;

#[derive(Clone)]
pub struct CourseAvailabilityService {
    directory: Arc<dyn DirectoryRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    requests: Arc<dyn CourseRequestRepository>,
    catalog: Arc<dyn CatalogRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CourseAvailabilityService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            directory: repos.directory.clone(),
            assignments: repos.assignments.clone(),
            requests: repos.requests.clone(),
            catalog: repos.catalog.clone(),
            progress: repos.progress.clone(),
        }
    }

    async fn ensure_organization(&self, organization_id: Uuid) -> Result<(), AppError> {
        found(
            self.directory.get_organization(organization_id).await?,
            "Organization",
        )?;
        Ok(())
    }

    async fn ensure_course(&self, course_id: Uuid) -> Result<(), AppError> {
        found(self.catalog.get_course(course_id).await?, "Course")?;
        Ok(())
    }

    /// Employee record the actor is allowed to manage
    async fn managed_employee(&self, actor: &Actor, employee_id: Uuid) -> Result<User, AppError> {
        let employee = found(self.directory.get_user(employee_id).await?, "Employee")?;
        let organization_id = match (employee.role, employee.organization_id) {
            (UserRole::Employee, Some(org_id)) => org_id,
            _ => return Err(AppError::NotFound("Employee not found".to_string())),
        };
        actor.require_organization_manager(organization_id)?;
        Ok(employee)
    }

    /// Replace the organization's course set and resynchronize every employee to it.
    #[tracing::instrument(skip(self, actor, course_ids), fields(actor = %actor.username))]
    pub async fn replace_organization_courses(
        &self,
        actor: &Actor,
        organization_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<CourseSetReplacement, AppError> {
        actor.require_admin()?;
        self.ensure_organization(organization_id).await?;
        for course_id in course_ids {
            if self.catalog.get_course(*course_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Course {} not found", course_id)));
            }
        }

        let replacement = self
            .assignments
            .replace_organization_courses(organization_id, course_ids)
            .await?;

        tracing::info!(
            organization_id = %organization_id,
            course_count = replacement.assigned_course_ids.len(),
            employees_updated = replacement.employees_updated,
            "Organization course set replaced"
        );
        Ok(replacement)
    }

    /// Append one course to the organization. Open to admins and the
    /// organization's own portal admin.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn assign_course_to_organization(
        &self,
        actor: &Actor,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<AssignmentResult, AppError> {
        actor.require_organization_manager(organization_id)?;
        self.ensure_organization(organization_id).await?;
        self.ensure_course(course_id).await?;

        if !self
            .assignments
            .add_organization_course(organization_id, course_id)
            .await?
        {
            return Err(AppError::Conflict(
                "Course is already assigned to this organization".to_string(),
            ));
        }

        tracing::info!(organization_id = %organization_id, course_id = %course_id, "Course assigned to organization");
        Ok(AssignmentResult {
            success: true,
            message: "Course assigned to organization".to_string(),
            course_id,
            employee_id: None,
            employees_updated: 0,
        })
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn unassign_course_from_organization(
        &self,
        actor: &Actor,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<AssignmentResult, AppError> {
        actor.require_organization_manager(organization_id)?;
        self.ensure_organization(organization_id).await?;

        let employees_updated = self
            .assignments
            .remove_organization_course(organization_id, course_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Course is not assigned to this organization".to_string())
            })?;

        tracing::info!(
            organization_id = %organization_id,
            course_id = %course_id,
            employees_updated,
            "Course removed from organization"
        );
        Ok(AssignmentResult {
            success: true,
            message: format!(
                "Course removed from organization and {} employee(s)",
                employees_updated
            ),
            course_id,
            employee_id: None,
            employees_updated,
        })
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn assign_course_to_all_employees(
        &self,
        actor: &Actor,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<AssignmentResult, AppError> {
        actor.require_organization_manager(organization_id)?;
        self.ensure_organization(organization_id).await?;

        let employees_updated = match self
            .assignments
            .assign_course_to_all_employees(organization_id, course_id)
            .await?
        {
            BulkAssignment::Assigned(count) => count,
            BulkAssignment::NotOffered => {
                return Err(AppError::InvalidInput(
                    "Course is not assigned to this organization".to_string(),
                ))
            }
        };

        tracing::info!(
            organization_id = %organization_id,
            course_id = %course_id,
            employees_updated,
            "Course pushed to all employees"
        );
        Ok(AssignmentResult {
            success: true,
            message: format!("Course assigned to {} employee(s)", employees_updated),
            course_id,
            employee_id: None,
            employees_updated,
        })
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn assign_course_to_employee(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<AssignmentResult, AppError> {
        let employee = self.managed_employee(actor, employee_id).await?;
        self.ensure_course(course_id).await?;
        let organization_id = employee
            .organization_id
            .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

        match self
            .assignments
            .assign_course_to_employee(organization_id, employee_id, course_id)
            .await?
        {
            EmployeeAssignment::NotOffered => Err(AppError::InvalidInput(
                "Course is not assigned to the employee's organization".to_string(),
            )),
            EmployeeAssignment::AlreadyAssigned => Err(AppError::Conflict(
                "Course is already assigned to this employee".to_string(),
            )),
            EmployeeAssignment::Assigned => {
                tracing::info!(employee_id = %employee_id, course_id = %course_id, "Course assigned to employee");
                Ok(AssignmentResult {
                    success: true,
                    message: format!("Course assigned to {}", employee.username),
                    course_id,
                    employee_id: Some(employee_id),
                    employees_updated: 1,
                })
            }
        }
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn unassign_course_from_employee(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<AssignmentResult, AppError> {
        let employee = self.managed_employee(actor, employee_id).await?;

        if !self
            .assignments
            .remove_employee_course(employee_id, course_id)
            .await?
        {
            return Err(AppError::InvalidInput(
                "Course is not assigned to this employee".to_string(),
            ));
        }

        tracing::info!(employee_id = %employee_id, course_id = %course_id, "Course removed from employee");
        Ok(AssignmentResult {
            success: true,
            message: format!("Course removed from {}", employee.username),
            course_id,
            employee_id: Some(employee_id),
            employees_updated: 1,
        })
    }

    /// Employees of the portal admin's organization holding `course_id`
    pub async fn list_course_assignees(
        &self,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<CourseAssignees, AppError> {
        let organization_id = actor.require_portal_admin()?;
        let offered = self
            .assignments
            .organization_course_ids(organization_id)
            .await?;
        if !offered.contains(&course_id) {
            return Err(AppError::NotFound(
                "Course is not assigned to your organization".to_string(),
            ));
        }

        let employees = self
            .assignments
            .list_course_assignees(organization_id, course_id)
            .await?
            .into_iter()
            .filter(|u| u.role == UserRole::Employee)
            .collect();

        Ok(CourseAssignees {
            course_id,
            employees,
        })
    }

    /// Published courses with price and the organization's standing on each
    pub async fn portal_course_catalog(&self, actor: &Actor) -> Result<Vec<PortalCourse>, AppError> {
        let organization_id = actor.require_portal_admin()?;
        let assigned: HashSet<Uuid> = self
            .assignments
            .organization_course_ids(organization_id)
            .await?
            .into_iter()
            .collect();
        let pending: HashSet<Uuid> = self
            .requests
            .pending_course_ids(organization_id)
            .await?
            .into_iter()
            .collect();

        let courses = self
            .catalog
            .list_courses(Some(CourseStatus::Published))
            .await?;

        Ok(courses
            .into_iter()
            .map(|summary| {
                let course_status = if assigned.contains(&summary.course.id) {
                    CourseAvailability::Assigned
                } else if pending.contains(&summary.course.id) {
                    CourseAvailability::Pending
                } else {
                    CourseAvailability::Available
                };
                PortalCourse {
                    price: course_price(summary.module_count),
                    module_count: summary.module_count,
                    course_status,
                    course: summary.course,
                }
            })
            .collect())
    }

    /// Courses the employee holds that the organization still offers, in assignment order
    pub async fn accessible_course_ids(&self, actor: &Actor) -> Result<Vec<Uuid>, AppError> {
        let organization_id = actor.require_employee()?;
        let offered: HashSet<Uuid> = self
            .assignments
            .organization_course_ids(organization_id)
            .await?
            .into_iter()
            .collect();

        Ok(self
            .assignments
            .user_course_ids(actor.user_id)
            .await?
            .into_iter()
            .filter(|id| offered.contains(id))
            .collect())
    }

    /// Admins reach every course, portal admins their organization's courses, and
    /// employees only courses present in both their own and their organization's set.
    pub async fn ensure_course_access(&self, actor: &Actor, course_id: Uuid) -> Result<(), AppError> {
        let allowed = match actor.role {
            UserRole::Admin => true,
            UserRole::PortalAdmin => {
                let organization_id = actor.require_portal_admin()?;
                self.assignments
                    .organization_course_ids(organization_id)
                    .await?
                    .contains(&course_id)
            }
            UserRole::Employee => self.accessible_course_ids(actor).await?.contains(&course_id),
        };

        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this course".to_string(),
            ))
        }
    }

    pub async fn my_courses(&self, actor: &Actor) -> Result<Vec<EnrolledCourse>, AppError> {
        let course_ids = self.accessible_course_ids(actor).await?;

        let mut enrolled = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            let Some(course) = self.catalog.get_course(course_id).await? else {
                continue;
            };
            let module_count = self.catalog.count_modules(course_id).await?;
            let progress = self.progress.get_progress(actor.user_id, course_id).await?;

            enrolled.push(EnrolledCourse {
                course,
                module_count,
                progress_percentage: progress.as_ref().map(|p| p.progress_percentage),
                completed_modules: progress.as_ref().map(|p| p.completed_modules),
                is_completed: progress.as_ref().map(|p| p.is_completed()).unwrap_or(false),
            });
        }
        Ok(enrolled)
    }
}
