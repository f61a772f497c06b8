//! System-wide account directory API tests.

mod helpers;

use helpers::{api_path, setup_test_app, uuid_field};
use serde_json::Value;

#[tokio::test]
async fn test_admin_lists_users_and_portal_admins() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (employee_id, _token) = app.create_employee(&portal_token, "alice").await;

    let response = app
        .client()
        .get(&api_path("/users"))
        .add_header("Authorization", app.admin_token())
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let users: Vec<Value> = response.json();
    assert_eq!(users.len(), 3);
    let alice = users
        .iter()
        .find(|u| uuid_field(u, "id") == employee_id)
        .expect("employee listed");
    assert_eq!(alice["role"], "employee");
    assert_eq!(uuid_field(&alice["organization"], "id"), organization_id);
    assert_eq!(alice["organization"]["name"], "acme");

    let response = app
        .client()
        .get(&api_path("/portal-admins"))
        .add_header("Authorization", app.admin_token())
        .await;
    let admins: Vec<Value> = response.json();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0]["username"], "acme-admin");
    assert_eq!(admins[0]["organization"]["domain"], "acme.example");
}

#[tokio::test]
async fn test_portal_admin_cannot_list_directory() {
    let app = setup_test_app().await;
    let (_organization_id, portal_token) = app.create_organization("acme").await;

    for path in ["/users", "/portal-admins"] {
        let response = app
            .client()
            .get(&api_path(path))
            .add_header("Authorization", portal_token.clone())
            .await;
        assert_eq!(response.status_code(), 403);
        assert_eq!(response.json::<Value>()["code"], "FORBIDDEN");
    }
}
