//! In-process store
//!
//! Backs every repository trait with one shared state behind a single
//! `tokio::sync::RwLock`. Each trait method takes the lock once, so every
//! operation is atomic with respect to the others, mirroring the row locks the
//! PostgreSQL repositories take.

mod assignment;
mod catalog;
mod course_request;
mod directory;
mod progress;
mod statistics;

use std::collections::HashMap;
use std::sync::Arc;

use learnhub_core::models::{
    ContentInteraction, Course, CourseProgress, CourseRequest, Module, ModuleContent, Organization,
    QuizOption, QuizQuestion, User, UserRole,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub(crate) struct MemoryState {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    /// Organization course sets in assignment order
    organization_courses: HashMap<Uuid, Vec<Uuid>>,
    /// Employee course sets in assignment order
    user_courses: HashMap<Uuid, Vec<Uuid>>,
    requests: Vec<CourseRequest>,
    courses: HashMap<Uuid, Course>,
    modules: HashMap<Uuid, Module>,
    contents: HashMap<Uuid, ModuleContent>,
    questions: HashMap<Uuid, QuizQuestion>,
    /// Options per question, in position order
    options: HashMap<Uuid, Vec<QuizOption>>,
    progress: HashMap<(Uuid, Uuid), CourseProgress>,
    interactions: HashMap<(Uuid, Uuid), ContentInteraction>,
}

impl MemoryState {
    fn employees_of(&self, organization_id: Uuid) -> impl Iterator<Item = &User> {
        self.users.values().filter(move |u| {
            u.organization_id == Some(organization_id) && u.role == UserRole::Employee
        })
    }

    fn organization_has_course(&self, organization_id: Uuid, course_id: Uuid) -> bool {
        self.organization_courses
            .get(&organization_id)
            .map(|ids| ids.contains(&course_id))
            .unwrap_or(false)
    }

    fn course_of_module(&self, module_id: Uuid) -> Option<Uuid> {
        self.modules.get(&module_id).map(|m| m.course_id)
    }

    /// Drop a user and everything that references them.
    fn remove_user(&mut self, user_id: Uuid) -> Option<User> {
        let user = self.users.remove(&user_id)?;

        self.user_courses.remove(&user_id);
        self.progress.retain(|(uid, _), _| *uid != user_id);
        self.interactions.retain(|(uid, _), _| *uid != user_id);
        self.requests.retain(|r| r.requested_by != user_id);
        for request in self.requests.iter_mut() {
            if request.approved_by == Some(user_id) {
                request.approved_by = None;
            }
        }
        for org in self.organizations.values_mut() {
            if org.portal_admin_id == Some(user_id) {
                org.portal_admin_id = None;
            }
        }

        Some(user)
    }

    fn remove_content(&mut self, content_id: Uuid) {
        self.contents.remove(&content_id);
        let question_ids: Vec<Uuid> = self
            .questions
            .values()
            .filter(|q| q.content_id == content_id)
            .map(|q| q.id)
            .collect();
        for id in question_ids {
            self.questions.remove(&id);
            self.options.remove(&id);
        }
        self.interactions.retain(|(_, cid), _| *cid != content_id);
    }

    /// Drop a course with its structure and every reference to it.
    fn remove_course(&mut self, course_id: Uuid) -> bool {
        if self.courses.remove(&course_id).is_none() {
            return false;
        }

        let module_ids: Vec<Uuid> = self
            .modules
            .values()
            .filter(|m| m.course_id == course_id)
            .map(|m| m.id)
            .collect();
        for module_id in &module_ids {
            self.modules.remove(module_id);
            let content_ids: Vec<Uuid> = self
                .contents
                .values()
                .filter(|c| c.module_id == *module_id)
                .map(|c| c.id)
                .collect();
            for content_id in content_ids {
                self.remove_content(content_id);
            }
        }

        for ids in self.organization_courses.values_mut() {
            ids.retain(|id| *id != course_id);
        }
        for ids in self.user_courses.values_mut() {
            ids.retain(|id| *id != course_id);
        }
        self.requests.retain(|r| r.course_id != course_id);
        self.progress.retain(|(_, cid), _| *cid != course_id);

        true
    }
}

/// Shared in-process backend; clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One past the highest position among `positions`, starting at 1.
fn next_position(positions: impl Iterator<Item = i32>) -> i32 {
    positions.max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::{
        AssignmentRepository, CatalogRepository, CourseRequestRepository, DirectoryRepository,
        ProgressRepository, RequestFilter,
    };
    use chrono::Utc;
    use learnhub_core::models::{
        BulkAssignment, CompletionTarget, CourseStatus, CreateRequestOutcome, Interaction,
        NewCourseRequest, NewOrganization, NewUser, OrganizationStatus,
    };
    use rust_decimal::Decimal;

    async fn organization(store: &MemoryStore, name: &str) -> (Organization, User) {
        store
            .create_organization(NewOrganization {
                name: name.to_string(),
                domain: format!("{}.example", name),
                status: OrganizationStatus::Active,
                portal_admin_username: format!("{}-admin", name),
                portal_admin_email: format!("admin@{}.example", name),
            })
            .await
            .unwrap()
    }

    async fn employee(store: &MemoryStore, org: Uuid, username: &str) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                role: UserRole::Employee,
                designation: None,
                organization_id: Some(org),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_employee_inherits_organization_courses() {
        let store = MemoryStore::new();
        let (org, _) = organization(&store, "acme").await;
        let course = store
            .create_course("Safety", None, CourseStatus::Published)
            .await
            .unwrap();
        store
            .replace_organization_courses(org.id, &[course.id])
            .await
            .unwrap();

        let user = employee(&store, org.id, "alice").await;
        assert_eq!(store.user_course_ids(user.id).await.unwrap(), vec![course.id]);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let (org, _) = organization(&store, "acme").await;
        employee(&store, org.id, "alice").await;

        let err = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                role: UserRole::Employee,
                designation: None,
                organization_id: Some(org.id),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, learnhub_core::AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_course_cascades() {
        let store = MemoryStore::new();
        let (org, admin) = organization(&store, "acme").await;
        let course = store
            .create_course("Safety", None, CourseStatus::Published)
            .await
            .unwrap();
        let module = store
            .create_module(course.id, "Intro", None, None)
            .await
            .unwrap();
        let user = employee(&store, org.id, "alice").await;
        store.add_organization_course(org.id, course.id).await.unwrap();
        store
            .assign_course_to_all_employees(org.id, course.id)
            .await
            .unwrap();
        store
            .record_interaction(
                user.id,
                Uuid::new_v4(),
                &Interaction::ContentComplete,
                Some(CompletionTarget {
                    course_id: course.id,
                    module_id: module.id,
                }),
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(store.delete_course(course.id).await.unwrap());

        assert!(store.get_module(module.id).await.unwrap().is_none());
        assert!(store.organization_course_ids(org.id).await.unwrap().is_empty());
        assert!(store.user_course_ids(user.id).await.unwrap().is_empty());
        assert!(store.get_progress(user.id, course.id).await.unwrap().is_none());
        assert!(store
            .list_requests(RequestFilter {
                requested_by: Some(admin.id),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_organization_cascades() {
        let store = MemoryStore::new();
        let (org, admin) = organization(&store, "acme").await;
        let course = store
            .create_course("Safety", None, CourseStatus::Published)
            .await
            .unwrap();
        employee(&store, org.id, "alice").await;
        let outcome = store
            .create_request(NewCourseRequest {
                organization_id: org.id,
                course_id: course.id,
                requested_by: admin.id,
                payment_amount: Decimal::ZERO,
            })
            .await
            .unwrap();
        assert!(matches!(outcome, CreateRequestOutcome::Created(_)));

        let deletion = store.delete_organization(org.id).await.unwrap().unwrap();
        assert_eq!(deletion.users_deleted, 2);
        assert_eq!(deletion.course_requests_deleted, 1);
        assert!(store.get_organization(org.id).await.unwrap().is_none());
        assert!(store.get_user(admin.id).await.unwrap().is_none());
        assert!(store.delete_organization(org.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_push_to_all_checks_offer_under_lock() {
        let store = MemoryStore::new();
        let (org, _) = organization(&store, "acme").await;
        let course = store
            .create_course("Safety", None, CourseStatus::Published)
            .await
            .unwrap();
        let alice = employee(&store, org.id, "alice").await;

        let outcome = store
            .assign_course_to_all_employees(org.id, course.id)
            .await
            .unwrap();
        assert_eq!(outcome, BulkAssignment::NotOffered);
        assert!(store.user_course_ids(alice.id).await.unwrap().is_empty());

        store.add_organization_course(org.id, course.id).await.unwrap();
        let outcome = store
            .assign_course_to_all_employees(org.id, course.id)
            .await
            .unwrap();
        assert_eq!(outcome, BulkAssignment::Assigned(1));
    }

    #[tokio::test]
    async fn test_organization_unassign_counts_employees_only() {
        let store = MemoryStore::new();
        let (org, portal_admin) = organization(&store, "acme").await;
        let course = store
            .create_course("Safety", None, CourseStatus::Published)
            .await
            .unwrap();
        let alice = employee(&store, org.id, "alice").await;
        store.add_organization_course(org.id, course.id).await.unwrap();
        for user_id in [alice.id, portal_admin.id] {
            store
                .assign_course_to_employee(org.id, user_id, course.id)
                .await
                .unwrap();
        }

        let updated = store
            .remove_organization_course(org.id, course.id)
            .await
            .unwrap();
        assert_eq!(updated, Some(1));
        assert!(store.user_course_ids(alice.id).await.unwrap().is_empty());
    }

    #[test]
    fn test_next_position_starts_at_one() {
        assert_eq!(next_position(std::iter::empty()), 1);
        assert_eq!(next_position([3, 1, 2].into_iter()), 4);
    }
}
