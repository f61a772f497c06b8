use chrono::Utc;
use learnhub_core::models::{
    NewOrganization, NewUser, Organization, OrganizationDeletion, OrganizationStatus, User,
    UserRole,
};
use learnhub_core::AppError;
use uuid::Uuid;

use super::{MemoryState, MemoryStore};
use crate::db::traits::DirectoryRepository;

fn ensure_unique_user(
    state: &MemoryState,
    username: &str,
    email: &str,
    message: &str,
) -> Result<(), AppError> {
    if state
        .users
        .values()
        .any(|u| u.username == username || u.email == email)
    {
        return Err(AppError::Conflict(message.to_string()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl DirectoryRepository for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        ensure_unique_user(
            &state,
            &user.username,
            &user.email,
            "Username or email already exists",
        )?;

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            role: user.role,
            designation: user.designation,
            organization_id: user.organization_id,
            created_at: Utc::now(),
        };

        if let (UserRole::Employee, Some(org_id)) = (created.role, created.organization_id) {
            let courses = state
                .organization_courses
                .get(&org_id)
                .cloned()
                .unwrap_or_default();
            state.user_courses.insert(created.id, courses);
        }

        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_employees(&self, organization_id: Uuid) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        let mut employees: Vec<User> = state.employees_of(organization_id).cloned().collect();
        employees.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(employees)
    }

    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(users)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state.remove_user(user_id).is_some())
    }

    async fn create_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<(Organization, User), AppError> {
        let mut state = self.state.write().await;

        if state
            .organizations
            .values()
            .any(|o| o.name == organization.name)
        {
            return Err(AppError::Conflict(
                "Organization name already exists".to_string(),
            ));
        }
        ensure_unique_user(
            &state,
            &organization.portal_admin_username,
            &organization.portal_admin_email,
            "Portal admin username or email already exists",
        )?;

        let now = Utc::now();
        let org_id = Uuid::new_v4();
        let admin = User {
            id: Uuid::new_v4(),
            username: organization.portal_admin_username,
            email: organization.portal_admin_email,
            role: UserRole::PortalAdmin,
            designation: None,
            organization_id: Some(org_id),
            created_at: now,
        };
        let org = Organization {
            id: org_id,
            name: organization.name,
            domain: organization.domain,
            status: organization.status,
            portal_admin_id: Some(admin.id),
            created_at: now,
        };

        state.users.insert(admin.id, admin.clone());
        state.organizations.insert(org.id, org.clone());
        Ok((org, admin))
    }

    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .organizations
            .get(&organization_id)
            .cloned())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, AppError> {
        let state = self.state.read().await;
        let mut orgs: Vec<Organization> = state.organizations.values().cloned().collect();
        orgs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orgs)
    }

    async fn update_organization_status(
        &self,
        organization_id: Uuid,
        status: OrganizationStatus,
    ) -> Result<Option<Organization>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.organizations.get_mut(&organization_id).map(|org| {
            org.status = status;
            org.clone()
        }))
    }

    async fn delete_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationDeletion>, AppError> {
        let mut state = self.state.write().await;
        if !state.organizations.contains_key(&organization_id) {
            return Ok(None);
        }

        let before = state.requests.len();
        state.requests.retain(|r| r.organization_id != organization_id);
        let course_requests_deleted = (before - state.requests.len()) as u64;

        state.organization_courses.remove(&organization_id);

        let user_ids: Vec<Uuid> = state
            .users
            .values()
            .filter(|u| u.organization_id == Some(organization_id))
            .map(|u| u.id)
            .collect();
        for user_id in &user_ids {
            state.remove_user(*user_id);
        }

        state.organizations.remove(&organization_id);

        Ok(Some(OrganizationDeletion {
            organization_id,
            users_deleted: user_ids.len() as u64,
            course_requests_deleted,
        }))
    }
}
