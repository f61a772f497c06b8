use learnhub_core::models::{BulkAssignment, CourseSetReplacement, EmployeeAssignment, User};
use learnhub_core::AppError;
use uuid::Uuid;

use super::MemoryStore;
use crate::db::traits::AssignmentRepository;

#[async_trait::async_trait]
impl AssignmentRepository for MemoryStore {
    async fn organization_course_ids(&self, organization_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .organization_courses
            .get(&organization_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn user_course_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let state = self.state.read().await;
        Ok(state.user_courses.get(&user_id).cloned().unwrap_or_default())
    }

    async fn replace_organization_courses(
        &self,
        organization_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<CourseSetReplacement, AppError> {
        let mut state = self.state.write().await;

        let mut assigned: Vec<Uuid> = Vec::with_capacity(course_ids.len());
        for id in course_ids {
            if !assigned.contains(id) {
                assigned.push(*id);
            }
        }
        state
            .organization_courses
            .insert(organization_id, assigned.clone());

        let employee_ids: Vec<Uuid> = state.employees_of(organization_id).map(|u| u.id).collect();
        for employee_id in &employee_ids {
            state.user_courses.insert(*employee_id, assigned.clone());
        }

        let mut assigned_course_ids = assigned;
        assigned_course_ids.sort();

        Ok(CourseSetReplacement {
            organization_id,
            assigned_course_ids,
            employees_updated: employee_ids.len() as u64,
        })
    }

    async fn add_organization_course(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let courses = state.organization_courses.entry(organization_id).or_default();
        if courses.contains(&course_id) {
            return Ok(false);
        }
        courses.push(course_id);
        Ok(true)
    }

    async fn remove_organization_course(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<u64>, AppError> {
        let mut state = self.state.write().await;
        if !state.organization_has_course(organization_id, course_id) {
            return Ok(None);
        }
        if let Some(courses) = state.organization_courses.get_mut(&organization_id) {
            courses.retain(|id| *id != course_id);
        }

        let employee_ids: Vec<Uuid> = state.employees_of(organization_id).map(|u| u.id).collect();
        let mut employees_updated = 0;
        for employee_id in employee_ids {
            if let Some(courses) = state.user_courses.get_mut(&employee_id) {
                let before = courses.len();
                courses.retain(|id| *id != course_id);
                if courses.len() < before {
                    employees_updated += 1;
                }
            }
        }

        Ok(Some(employees_updated))
    }

    async fn assign_course_to_all_employees(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<BulkAssignment, AppError> {
        let mut state = self.state.write().await;
        if !state.organization_has_course(organization_id, course_id) {
            return Ok(BulkAssignment::NotOffered);
        }

        let employee_ids: Vec<Uuid> = state.employees_of(organization_id).map(|u| u.id).collect();

        let mut newly_assigned = 0;
        for employee_id in employee_ids {
            let courses = state.user_courses.entry(employee_id).or_default();
            if !courses.contains(&course_id) {
                courses.push(course_id);
                newly_assigned += 1;
            }
        }

        Ok(BulkAssignment::Assigned(newly_assigned))
    }

    async fn assign_course_to_employee(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<EmployeeAssignment, AppError> {
        let mut state = self.state.write().await;
        if !state.organization_has_course(organization_id, course_id) {
            return Ok(EmployeeAssignment::NotOffered);
        }

        let courses = state.user_courses.entry(employee_id).or_default();
        if courses.contains(&course_id) {
            return Ok(EmployeeAssignment::AlreadyAssigned);
        }
        courses.push(course_id);
        Ok(EmployeeAssignment::Assigned)
    }

    async fn remove_employee_course(
        &self,
        employee_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let Some(courses) = state.user_courses.get_mut(&employee_id) else {
            return Ok(false);
        };
        let before = courses.len();
        courses.retain(|id| *id != course_id);
        Ok(courses.len() < before)
    }

    async fn list_course_assignees(
        &self,
        organization_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.organization_id == Some(organization_id))
            .filter(|u| {
                state
                    .user_courses
                    .get(&u.id)
                    .map(|ids| ids.contains(&course_id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
