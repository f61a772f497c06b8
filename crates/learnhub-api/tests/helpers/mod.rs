//! Test helpers: build the application router over the in-memory store.
//!
//! Run from workspace root: `cargo test -p learnhub-api`.

pub mod auth;

use axum_test::TestServer;
use learnhub_api::constants;
use learnhub_api::setup::{routes, services};
use learnhub_core::models::User;
use learnhub_core::{BaseConfig, Config, LearnHubConfig, LogFormat, StoreBackend};
use learnhub_db::Repositories;
use serde_json::Value;
use uuid::Uuid;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn create_test_config() -> Config {
    Config(Box::new(LearnHubConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            jwt_issuer: None,
            environment: "test".to_string(),
            log_format: LogFormat::Compact,
        },
        store_backend: StoreBackend::Memory,
        database_url: None,
        bootstrap_admin: None,
    }))
}

/// Test application: server plus the seeded platform admin.
pub struct TestApp {
    pub server: TestServer,
    pub admin: User,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn admin_token(&self) -> String {
        auth::bearer(self.admin.id)
    }

    /// Create an organization through the API; returns (organization id, portal admin token).
    pub async fn create_organization(&self, name: &str) -> (Uuid, String) {
        let response = self
            .server
            .post(&api_path("/organizations"))
            .add_header("Authorization", self.admin_token())
            .json(&serde_json::json!({
                "name": name,
                "domain": format!("{}.example", name),
                "portal_admin": {
                    "username": format!("{}-admin", name),
                    "email": format!("admin@{}.example", name),
                },
            }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        let body: Value = response.json();
        (
            uuid_field(&body, "id"),
            auth::bearer(uuid_field(&body["portal_admin"], "id")),
        )
    }

    /// Create an employee through the portal admin; returns (user id, token).
    pub async fn create_employee(&self, portal_token: &str, username: &str) -> (Uuid, String) {
        let response = self
            .server
            .post(&api_path("/employees"))
            .add_header("Authorization", portal_token.to_string())
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}@corp.example", username),
            }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        let id = uuid_field(&response.json::<Value>(), "id");
        (id, auth::bearer(id))
    }

    /// Create a published course with one module; returns (course id, module id).
    pub async fn create_course(&self, title: &str) -> (Uuid, Uuid) {
        let response = self
            .server
            .post(&api_path("/courses"))
            .add_header("Authorization", self.admin_token())
            .json(&serde_json::json!({ "title": title, "status": "published" }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        let course_id = uuid_field(&response.json::<Value>(), "id");

        let response = self
            .server
            .post(&api_path(&format!("/courses/{}/modules", course_id)))
            .add_header("Authorization", self.admin_token())
            .json(&serde_json::json!({ "title": format!("{} basics", title) }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        (course_id, uuid_field(&response.json::<Value>(), "id"))
    }

    /// Assign a course to the organization and push it to every employee.
    pub async fn enroll_organization(&self, organization_id: Uuid, course_id: Uuid) {
        let response = self
            .server
            .post(&api_path(&format!("/organizations/{}/courses", organization_id)))
            .add_header("Authorization", self.admin_token())
            .json(&serde_json::json!({ "course_id": course_id }))
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());

        let response = self
            .server
            .post(&api_path(&format!(
                "/organizations/{}/courses/{}/assign-all",
                organization_id, course_id
            )))
            .add_header("Authorization", self.admin_token())
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
    }
}

pub fn uuid_field(value: &Value, field: &str) -> Uuid {
    value[field]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("missing uuid field {} in {}", field, value))
}

/// Setup a test app backed by a fresh in-memory store.
pub async fn setup_test_app() -> TestApp {
    let config = create_test_config();
    let repos = Repositories::in_memory();
    let state = services::initialize_services(&config, &repos)
        .await
        .expect("Failed to initialize services");
    let admin = state
        .services
        .directory
        .ensure_admin("platform-admin", "admin@learnhub.example")
        .await
        .expect("Failed to seed admin");
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        admin,
    }
}
