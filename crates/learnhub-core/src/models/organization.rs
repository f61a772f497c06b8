use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::User;

/// Organization (tenant) status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrganizationStatus {
    Active,
    Inactive,
    Suspended,
}

impl Display for OrganizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OrganizationStatus::Active => write!(f, "active"),
            OrganizationStatus::Inactive => write!(f, "inactive"),
            OrganizationStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl FromStr for OrganizationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(OrganizationStatus::Active),
            "inactive" => Ok(OrganizationStatus::Inactive),
            "suspended" => Ok(OrganizationStatus::Suspended),
            _ => Err(anyhow::anyhow!(
                "Invalid organization status: {}. Must be one of: active, inactive, suspended",
                s
            )),
        }
    }
}

/// Tenant owning a course set and a set of employees.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub status: OrganizationStatus,
    pub portal_admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Organization fields shown next to a user in directory listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationRef {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub status: OrganizationStatus,
}

impl From<&Organization> for OrganizationRef {
    fn from(organization: &Organization) -> Self {
        OrganizationRef {
            id: organization.id,
            name: organization.name.clone(),
            domain: organization.domain.clone(),
            status: organization.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub user: User,
    pub organization: Option<OrganizationRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationWithCourses {
    #[serde(flatten)]
    pub organization: Organization,
    pub course_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PortalAdminInput {
    #[validate(length(
        min = 3,
        max = 80,
        message = "Username must be between 3 and 80 characters"
    ))]
    pub username: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Organization name must be between 1 and 120 characters"
    ))]
    pub name: String,
    #[validate(length(min = 1, max = 120, message = "Domain is required"))]
    pub domain: String,
    #[serde(default)]
    pub status: Option<String>,
    #[validate(nested)]
    pub portal_admin: PortalAdminInput,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateOrganizationStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceOrganizationCoursesRequest {
    pub course_ids: Vec<Uuid>,
}

/// Insert payload for an organization and its portal admin
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub domain: String,
    pub status: OrganizationStatus,
    pub portal_admin_username: String,
    pub portal_admin_email: String,
}

/// Result of the cascading organization delete
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationDeletion {
    pub organization_id: Uuid,
    pub users_deleted: u64,
    pub course_requests_deleted: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedOrganization {
    #[serde(flatten)]
    pub organization: Organization,
    pub portal_admin: User,
}
