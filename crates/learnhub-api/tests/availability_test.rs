//! Course availability API tests.

mod helpers;

use helpers::{api_path, setup_test_app, uuid_field};
use serde_json::{json, Value};

#[tokio::test]
async fn test_new_employee_inherits_organization_courses() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (course_id, _module_id) = app.create_course("Security 101").await;
    app.enroll_organization(organization_id, course_id).await;

    let (_employee_id, employee_token) = app.create_employee(&portal_token, "alice").await;

    let response = app
        .client()
        .get(&api_path("/me/courses"))
        .add_header("Authorization", employee_token)
        .await;
    assert_eq!(response.status_code(), 200);
    let courses: Vec<Value> = response.json();
    assert_eq!(courses.len(), 1);
    assert_eq!(uuid_field(&courses[0], "id"), course_id);
    assert_eq!(courses[0]["module_count"], 1);
    assert_eq!(courses[0]["is_completed"], false);
}

#[tokio::test]
async fn test_duplicate_assignments_conflict() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (course_id, _module_id) = app.create_course("Security 101").await;
    app.enroll_organization(organization_id, course_id).await;
    let (employee_id, _token) = app.create_employee(&portal_token, "alice").await;

    let response = app
        .client()
        .post(&api_path(&format!("/organizations/{}/courses", organization_id)))
        .add_header("Authorization", app.admin_token())
        .json(&json!({ "course_id": course_id }))
        .await;
    assert_eq!(response.status_code(), 409);
    assert_eq!(response.json::<Value>()["code"], "CONFLICT");

    let response = app
        .client()
        .post(&api_path(&format!("/employees/{}/courses", employee_id)))
        .add_header("Authorization", portal_token)
        .json(&json!({ "course_id": course_id }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_unassigning_from_organization_removes_employee_access() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (course_id, _module_id) = app.create_course("Security 101").await;
    app.enroll_organization(organization_id, course_id).await;
    let (_employee_id, employee_token) = app.create_employee(&portal_token, "alice").await;

    let response = app
        .client()
        .delete(&api_path(&format!(
            "/organizations/{}/courses/{}",
            organization_id, course_id
        )))
        .add_header("Authorization", app.admin_token())
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["employees_updated"], 1);

    let response = app
        .client()
        .get(&api_path(&format!("/me/courses/{}", course_id)))
        .add_header("Authorization", employee_token.clone())
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .client()
        .get(&api_path("/me/courses"))
        .add_header("Authorization", employee_token)
        .await;
    assert!(response.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn test_replace_course_set_and_portal_catalog() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (first, _) = app.create_course("Security 101").await;
    let (second, _) = app.create_course("Privacy 101").await;

    let response = app
        .client()
        .put(&api_path(&format!("/organizations/{}/courses", organization_id)))
        .add_header("Authorization", app.admin_token())
        .json(&json!({ "course_ids": [first] }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());

    let response = app
        .client()
        .get(&api_path("/portal/courses"))
        .add_header("Authorization", portal_token.clone())
        .await;
    assert_eq!(response.status_code(), 200);
    let catalog: Vec<Value> = response.json();
    assert_eq!(catalog.len(), 2);
    let status_of = |id| {
        catalog
            .iter()
            .find(|c| uuid_field(c, "id") == id)
            .map(|c| c["course_status"].clone())
    };
    assert_eq!(status_of(first), Some(json!("assigned")));
    assert_eq!(status_of(second), Some(json!("available")));

    // replacing the whole set stays with admins
    let response = app
        .client()
        .put(&api_path(&format!("/organizations/{}/courses", organization_id)))
        .add_header("Authorization", portal_token)
        .json(&json!({ "course_ids": [first, second] }))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_portal_admin_manages_own_organization_courses() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (_globex_id, globex_token) = app.create_organization("globex").await;
    let (course_id, _module_id) = app.create_course("Security 101").await;
    let (_employee_id, _token) = app.create_employee(&portal_token, "alice").await;
    let offer = api_path(&format!("/organizations/{}/courses", organization_id));
    let withdraw = api_path(&format!(
        "/organizations/{}/courses/{}",
        organization_id, course_id
    ));

    let response = app
        .client()
        .post(&offer)
        .add_header("Authorization", globex_token.clone())
        .json(&json!({ "course_id": course_id }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .client()
        .post(&offer)
        .add_header("Authorization", portal_token.clone())
        .json(&json!({ "course_id": course_id }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());

    let response = app
        .client()
        .post(&api_path(&format!(
            "/organizations/{}/courses/{}/assign-all",
            organization_id, course_id
        )))
        .add_header("Authorization", portal_token.clone())
        .await;
    assert_eq!(response.json::<Value>()["employees_updated"], 1);

    let response = app
        .client()
        .delete(&withdraw)
        .add_header("Authorization", globex_token)
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .client()
        .delete(&withdraw)
        .add_header("Authorization", portal_token)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["employees_updated"], 1);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = setup_test_app().await;
    let (organization_id, _portal_token) = app.create_organization("acme").await;

    let response = app
        .client()
        .post(&api_path(&format!("/organizations/{}/courses", organization_id)))
        .add_header("Authorization", app.admin_token())
        .json(&json!({ "course_id": "not-a-uuid" }))
        .await;

    assert_eq!(response.status_code(), 400);
}
