use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Admin decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Approve,
    Reject,
}

impl RequestAction {
    pub fn resulting_status(&self) -> RequestStatus {
        match self {
            RequestAction::Approve => RequestStatus::Approved,
            RequestAction::Reject => RequestStatus::Rejected,
        }
    }
}

impl FromStr for RequestAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(RequestAction::Approve),
            "reject" => Ok(RequestAction::Reject),
            _ => Err(anyhow::anyhow!(
                "Invalid action: {}. Must be 'approve' or 'reject'",
                s
            )),
        }
    }
}

/// An organization's purchase request for a course
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CourseRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub course_id: Uuid,
    pub requested_by: Uuid,
    pub requested_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub payment_amount: Decimal,
    pub admin_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewCourseRequest {
    pub organization_id: Uuid,
    pub course_id: Uuid,
    pub requested_by: Uuid,
    pub payment_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct RequestResolution {
    pub request_id: Uuid,
    pub action: RequestAction,
    pub resolved_by: Uuid,
    pub admin_notes: Option<String>,
}

/// Result of creating a request, decided atomically against current state
#[derive(Debug, Clone)]
pub enum CreateRequestOutcome {
    Created(CourseRequest),
    AlreadyAssigned,
    AlreadyPending,
}

#[derive(Debug, Clone)]
pub enum ResolveRequestOutcome {
    Resolved(CourseRequest),
    NotFound,
    AlreadyResolved(RequestStatus),
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequestRequest {
    pub course_id: Uuid,
    #[serde(default)]
    pub payment_amount: Decimal,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ResolveCourseRequestRequest {
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseRequestList {
    pub requests: Vec<CourseRequest>,
    pub total: usize,
    pub pending: usize,
}

impl CourseRequestList {
    pub fn new(requests: Vec<CourseRequest>) -> Self {
        let pending = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count();
        CourseRequestList {
            total: requests.len(),
            pending,
            requests,
        }
    }
}
