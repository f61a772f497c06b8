#![allow(dead_code)]

use learnhub_core::models::{
    Course, CreateContentRequest, CreateCourseRequest, CreateEmployeeRequest,
    CreateModuleRequest, CreateOrganizationRequest, Module, ModuleContent, NewUser,
    PortalAdminInput, UserRole,
};
use learnhub_core::Actor;
use learnhub_db::Repositories;
use learnhub_services::LearnHubServices;
use uuid::Uuid;

pub struct World {
    pub repos: Repositories,
    pub services: LearnHubServices,
    pub admin: Actor,
}

impl World {
    pub async fn new() -> Self {
        let repos = Repositories::in_memory();
        let services = LearnHubServices::new(&repos);
        let admin = repos
            .directory
            .create_user(NewUser {
                username: "root".to_string(),
                email: "root@example.com".to_string(),
                role: UserRole::Admin,
                designation: None,
                organization_id: None,
            })
            .await
            .unwrap();

        World {
            repos,
            services,
            admin: Actor::from(&admin),
        }
    }

    /// Organization and its portal admin
    pub async fn organization(&self, name: &str) -> (Uuid, Actor) {
        let created = self
            .services
            .directory
            .create_organization(
                &self.admin,
                CreateOrganizationRequest {
                    name: name.to_string(),
                    domain: format!("{}.example", name),
                    status: None,
                    portal_admin: PortalAdminInput {
                        username: format!("{}-admin", name),
                        email: format!("admin@{}.example", name),
                    },
                },
            )
            .await
            .unwrap();
        (
            created.organization.id,
            Actor::from(&created.portal_admin),
        )
    }

    pub async fn employee(&self, portal_admin: &Actor, username: &str) -> Actor {
        let user = self
            .services
            .directory
            .create_employee(
                portal_admin,
                CreateEmployeeRequest {
                    username: username.to_string(),
                    email: format!("{}@example.com", username),
                    designation: None,
                },
            )
            .await
            .unwrap();
        Actor::from(&user)
    }

    pub async fn course(&self, title: &str) -> Course {
        self.services
            .catalog
            .create_course(
                &self.admin,
                CreateCourseRequest {
                    title: title.to_string(),
                    description: None,
                    status: Some("published".to_string()),
                },
            )
            .await
            .unwrap()
    }

    pub async fn module(&self, course_id: Uuid, title: &str) -> Module {
        self.services
            .catalog
            .create_module(
                &self.admin,
                course_id,
                CreateModuleRequest {
                    title: title.to_string(),
                    description: None,
                    position: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn content(&self, module_id: Uuid, content_type: &str) -> ModuleContent {
        let file_path = if content_type == "quiz" {
            None
        } else {
            Some(format!("uploads/{}.bin", Uuid::new_v4()))
        };
        self.services
            .catalog
            .create_content(
                &self.admin,
                module_id,
                CreateContentRequest {
                    title: format!("{} item", content_type),
                    content_type: content_type.to_string(),
                    file_path,
                    body: None,
                    position: None,
                },
            )
            .await
            .unwrap()
    }

    /// Offer the course to the organization and push it to every employee.
    pub async fn enroll_all(&self, organization_id: Uuid, course_id: Uuid) {
        self.services
            .availability
            .assign_course_to_organization(&self.admin, organization_id, course_id)
            .await
            .unwrap();
        self.services
            .availability
            .assign_course_to_all_employees(&self.admin, organization_id, course_id)
            .await
            .unwrap();
    }
}
