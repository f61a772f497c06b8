//! Statistics and reporting API tests.

mod helpers;

use helpers::{api_path, setup_test_app, uuid_field};
use serde_json::{json, Value};

#[tokio::test]
async fn test_statistics_are_scoped_by_role() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (_employee_id, employee_token) = app.create_employee(&portal_token, "alice").await;

    let response = app
        .client()
        .get(&api_path("/statistics"))
        .add_header("Authorization", app.admin_token())
        .await;
    assert_eq!(response.status_code(), 200);
    let system: Value = response.json();
    assert_eq!(system["scope"], "system");
    assert_eq!(system["total_organizations"], 1);
    assert_eq!(system["total_users"], 3);

    let response = app
        .client()
        .get(&api_path("/statistics"))
        .add_header("Authorization", portal_token)
        .await;
    let organization: Value = response.json();
    assert_eq!(organization["scope"], "organization");
    assert_eq!(uuid_field(&organization, "organization_id"), organization_id);
    assert_eq!(organization["employee_count"], 1);

    let response = app
        .client()
        .get(&api_path("/statistics"))
        .add_header("Authorization", employee_token)
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_risk_score_appears_in_report() {
    let app = setup_test_app().await;
    let (organization_id, portal_token) = app.create_organization("acme").await;
    let (course_id, module_id) = app.create_course("Security 101").await;
    let response = app
        .client()
        .post(&api_path(&format!("/modules/{}/contents", module_id)))
        .add_header("Authorization", app.admin_token())
        .json(&json!({ "title": "Policy", "content_type": "pdf", "file_path": "docs/policy.pdf" }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    let content_id = uuid_field(&response.json::<Value>(), "id");
    app.enroll_organization(organization_id, course_id).await;
    let (employee_id, employee_token) = app.create_employee(&portal_token, "alice").await;

    let risk_path = api_path(&format!("/progress/{}/{}/risk-score", employee_id, course_id));
    let response = app
        .client()
        .put(&risk_path)
        .add_header("Authorization", portal_token.clone())
        .json(&json!({ "risk_score": 80 }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .post(&api_path(&format!("/contents/{}/interactions", content_id)))
        .add_header("Authorization", employee_token)
        .json(&json!({ "interaction_type": "content_complete", "data": {} }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());

    let response = app
        .client()
        .put(&risk_path)
        .add_header("Authorization", portal_token.clone())
        .json(&json!({ "risk_score": 120 }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .put(&risk_path)
        .add_header("Authorization", portal_token.clone())
        .json(&json!({ "risk_score": 80 }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());

    let response = app
        .client()
        .get(&api_path(&format!("/organizations/{}/report", organization_id)))
        .add_header("Authorization", portal_token)
        .await;
    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["total_employees"], 1);
    assert_eq!(report["employees_at_risk_count"], 1);
}
