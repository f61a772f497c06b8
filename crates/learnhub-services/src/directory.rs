//! Organizations, their portal admins and employees.

use std::collections::HashMap;
use std::sync::Arc;

use learnhub_core::models::{
    CreateEmployeeRequest, CreateOrganizationRequest, CreatedOrganization, DirectoryEntry,
    NewOrganization, NewUser, Organization, OrganizationDeletion, OrganizationRef,
    OrganizationStatus, OrganizationWithCourses, UpdateOrganizationStatusRequest, User, UserRole,
};
use learnhub_core::{Actor, AppError};
use learnhub_db::{AssignmentRepository, DirectoryRepository, Repositories};
use uuid::Uuid;

use crate::found;

fn parse_status(value: &str) -> Result<OrganizationStatus, AppError> {
    value
        .trim()
        .parse()
        .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string()))
}

#[derive(Clone)]
pub struct DirectoryService {
    directory: Arc<dyn DirectoryRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

impl DirectoryService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            directory: repos.directory.clone(),
            assignments: repos.assignments.clone(),
        }
    }

    /// Build the caller identity from the stored user record.
    pub async fn resolve_actor(&self, user_id: Uuid) -> Result<Actor, AppError> {
        let user = self
            .directory
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;
        Ok(Actor::from(&user))
    }

    /// Create the admin account named in configuration unless it already exists.
    pub async fn ensure_admin(&self, username: &str, email: &str) -> Result<User, AppError> {
        if let Some(existing) = self.directory.get_user_by_username(username).await? {
            if existing.role != UserRole::Admin {
                return Err(AppError::Conflict(format!(
                    "User {} exists but is not an admin",
                    username
                )));
            }
            return Ok(existing);
        }

        let admin = self
            .directory
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                role: UserRole::Admin,
                designation: None,
                organization_id: None,
            })
            .await?;
        tracing::info!(user_id = %admin.id, username = %admin.username, "Bootstrap admin created");
        Ok(admin)
    }

    async fn with_courses(&self, organization: Organization) -> Result<OrganizationWithCourses, AppError> {
        let course_ids = self
            .assignments
            .organization_course_ids(organization.id)
            .await?;
        Ok(OrganizationWithCourses {
            organization,
            course_ids,
        })
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username, name = %request.name))]
    pub async fn create_organization(
        &self,
        actor: &Actor,
        request: CreateOrganizationRequest,
    ) -> Result<CreatedOrganization, AppError> {
        actor.require_admin()?;
        let status = match request.status.as_deref() {
            Some(s) => parse_status(s)?,
            None => OrganizationStatus::Active,
        };

        let (organization, portal_admin) = self
            .directory
            .create_organization(NewOrganization {
                name: request.name.trim().to_string(),
                domain: request.domain.trim().to_string(),
                status,
                portal_admin_username: request.portal_admin.username.trim().to_string(),
                portal_admin_email: request.portal_admin.email.trim().to_lowercase(),
            })
            .await?;

        tracing::info!(organization_id = %organization.id, portal_admin_id = %portal_admin.id, "Organization created");
        Ok(CreatedOrganization {
            organization,
            portal_admin,
        })
    }

    pub async fn list_organizations(
        &self,
        actor: &Actor,
    ) -> Result<Vec<OrganizationWithCourses>, AppError> {
        actor.require_admin()?;
        let organizations = self.directory.list_organizations().await?;

        let mut listed = Vec::with_capacity(organizations.len());
        for organization in organizations {
            listed.push(self.with_courses(organization).await?);
        }
        Ok(listed)
    }

    pub async fn get_organization(
        &self,
        actor: &Actor,
        organization_id: Uuid,
    ) -> Result<OrganizationWithCourses, AppError> {
        actor.require_organization_manager(organization_id)?;
        let organization = found(
            self.directory.get_organization(organization_id).await?,
            "Organization",
        )?;
        self.with_courses(organization).await
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn update_organization_status(
        &self,
        actor: &Actor,
        organization_id: Uuid,
        request: UpdateOrganizationStatusRequest,
    ) -> Result<Organization, AppError> {
        actor.require_admin()?;
        let status = parse_status(&request.status)?;

        let organization = found(
            self.directory
                .update_organization_status(organization_id, status)
                .await?,
            "Organization",
        )?;
        tracing::info!(organization_id = %organization_id, status = %status, "Organization status updated");
        Ok(organization)
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn delete_organization(
        &self,
        actor: &Actor,
        organization_id: Uuid,
    ) -> Result<OrganizationDeletion, AppError> {
        actor.require_admin()?;
        let deletion = found(
            self.directory.delete_organization(organization_id).await?,
            "Organization",
        )?;

        tracing::info!(
            organization_id = %organization_id,
            users_deleted = deletion.users_deleted,
            course_requests_deleted = deletion.course_requests_deleted,
            "Organization deleted"
        );
        Ok(deletion)
    }

    /// New employees receive the organization's current course set.
    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username, username = %request.username))]
    pub async fn create_employee(
        &self,
        actor: &Actor,
        request: CreateEmployeeRequest,
    ) -> Result<User, AppError> {
        let organization_id = actor.require_portal_admin()?;

        let employee = self
            .directory
            .create_user(NewUser {
                username: request.username.trim().to_string(),
                email: request.email.trim().to_lowercase(),
                role: UserRole::Employee,
                designation: request
                    .designation
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                organization_id: Some(organization_id),
            })
            .await?;

        tracing::info!(employee_id = %employee.id, organization_id = %organization_id, "Employee created");
        Ok(employee)
    }

    /// Every account with its organization
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<DirectoryEntry>, AppError> {
        actor.require_admin()?;
        self.directory_entries(None).await
    }

    pub async fn list_portal_admins(&self, actor: &Actor) -> Result<Vec<DirectoryEntry>, AppError> {
        actor.require_admin()?;
        self.directory_entries(Some(UserRole::PortalAdmin)).await
    }

    async fn directory_entries(
        &self,
        role: Option<UserRole>,
    ) -> Result<Vec<DirectoryEntry>, AppError> {
        let organizations: HashMap<Uuid, Organization> = self
            .directory
            .list_organizations()
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        let users = self.directory.list_users(role).await?;
        Ok(users
            .into_iter()
            .map(|user| {
                let organization = user
                    .organization_id
                    .and_then(|id| organizations.get(&id))
                    .map(OrganizationRef::from);
                DirectoryEntry { user, organization }
            })
            .collect())
    }

    pub async fn list_employees(&self, actor: &Actor) -> Result<Vec<User>, AppError> {
        let organization_id = actor.require_portal_admin()?;
        self.directory.list_employees(organization_id).await
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn delete_employee(&self, actor: &Actor, employee_id: Uuid) -> Result<(), AppError> {
        let organization_id = actor.require_portal_admin()?;
        let employee = found(self.directory.get_user(employee_id).await?, "Employee")?;
        if employee.role != UserRole::Employee || employee.organization_id != Some(organization_id)
        {
            return Err(AppError::NotFound("Employee not found".to_string()));
        }

        self.directory.delete_user(employee_id).await?;
        tracing::info!(employee_id = %employee_id, organization_id = %organization_id, "Employee deleted");
        Ok(())
    }
}
