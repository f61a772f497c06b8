//! Authenticated caller identity
//!
//! Resolved once at the request boundary from the stored user record and passed
//! explicitly to every service operation.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{User, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            organization_id: user.organization_id,
        }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Organization managed by a portal admin
    pub fn require_portal_admin(&self) -> Result<Uuid, AppError> {
        match (self.role, self.organization_id) {
            (UserRole::PortalAdmin, Some(org_id)) => Ok(org_id),
            (UserRole::PortalAdmin, None) => Err(AppError::Forbidden(
                "Portal admin is not linked to an organization".to_string(),
            )),
            _ => Err(AppError::Forbidden(
                "Portal admin access required".to_string(),
            )),
        }
    }

    /// Organization of an employee
    pub fn require_employee(&self) -> Result<Uuid, AppError> {
        match (self.role, self.organization_id) {
            (UserRole::Employee, Some(org_id)) => Ok(org_id),
            (UserRole::Employee, None) => Err(AppError::Forbidden(
                "Employee is not linked to an organization".to_string(),
            )),
            _ => Err(AppError::Forbidden("Employee access required".to_string())),
        }
    }

    /// Admins may act on any organization; portal admins only on their own.
    pub fn require_organization_manager(&self, organization_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() {
            return Ok(());
        }
        let own = self.require_portal_admin()?;
        if own == organization_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Cannot manage another organization".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole, org: Option<Uuid>) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "someone".to_string(),
            role,
            organization_id: org,
        }
    }

    #[test]
    fn test_role_guards() {
        let org = Uuid::new_v4();
        assert!(actor(UserRole::Admin, None).require_admin().is_ok());
        assert!(actor(UserRole::PortalAdmin, Some(org)).require_admin().is_err());
        assert_eq!(
            actor(UserRole::PortalAdmin, Some(org)).require_portal_admin().unwrap(),
            org
        );
        assert!(actor(UserRole::Employee, Some(org)).require_portal_admin().is_err());
        assert!(actor(UserRole::Employee, None).require_employee().is_err());
    }

    #[test]
    fn test_organization_manager_scope() {
        let org = Uuid::new_v4();
        assert!(actor(UserRole::Admin, None)
            .require_organization_manager(org)
            .is_ok());
        assert!(actor(UserRole::PortalAdmin, Some(org))
            .require_organization_manager(org)
            .is_ok());
        assert!(actor(UserRole::PortalAdmin, Some(Uuid::new_v4()))
            .require_organization_manager(org)
            .is_err());
    }
}
