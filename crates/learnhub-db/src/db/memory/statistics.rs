use std::collections::HashMap;

use chrono::{DateTime, Utc};
use learnhub_core::models::{OrganizationStatus, SystemCounts, TopCourse, UserRole};
use learnhub_core::AppError;
use uuid::Uuid;

use super::MemoryStore;
use crate::db::traits::{EnrollmentScope, StatisticsRepository};

#[async_trait::async_trait]
impl StatisticsRepository for MemoryStore {
    async fn system_counts(&self, recent_since: DateTime<Utc>) -> Result<SystemCounts, AppError> {
        let state = self.state.read().await;
        let users_with = |role: UserRole| state.users.values().filter(|u| u.role == role).count();

        Ok(SystemCounts {
            total_courses: state.courses.len() as i64,
            total_users: state.users.len() as i64,
            total_organizations: state.organizations.len() as i64,
            active_organizations: state
                .organizations
                .values()
                .filter(|o| o.status == OrganizationStatus::Active)
                .count() as i64,
            total_portal_admins: users_with(UserRole::PortalAdmin) as i64,
            total_employees: users_with(UserRole::Employee) as i64,
            recent_users: state
                .users
                .values()
                .filter(|u| u.created_at >= recent_since)
                .count() as i64,
            recent_courses: state
                .courses
                .values()
                .filter(|c| c.created_at >= recent_since)
                .count() as i64,
        })
    }

    async fn count_users_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.created_at >= start && u.created_at < end)
            .count() as i64)
    }

    async fn top_courses(
        &self,
        scope: EnrollmentScope,
        limit: i64,
    ) -> Result<Vec<TopCourse>, AppError> {
        let state = self.state.read().await;

        let mut enrollments: HashMap<Uuid, i64> = HashMap::new();
        for progress in state.progress.values() {
            let counted = match scope {
                EnrollmentScope::System => true,
                EnrollmentScope::Organization(org_id) => {
                    state.organization_has_course(org_id, progress.course_id)
                        && state
                            .users
                            .get(&progress.user_id)
                            .map(|u| u.organization_id == Some(org_id))
                            .unwrap_or(false)
                }
            };
            if counted {
                *enrollments.entry(progress.course_id).or_default() += 1;
            }
        }

        let mut ranked: Vec<TopCourse> = enrollments
            .into_iter()
            .filter_map(|(course_id, count)| {
                state.courses.get(&course_id).map(|c| TopCourse {
                    id: c.id,
                    title: c.title.clone(),
                    enrollments: count,
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.enrollments
                .cmp(&a.enrollments)
                .then_with(|| a.title.cmp(&b.title))
                .then(a.id.cmp(&b.id))
        });
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }
}
