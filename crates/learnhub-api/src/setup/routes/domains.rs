//! Domain route groups (organizations, availability, catalog, learning, requests, statistics).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

fn api(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub fn organization_routes() -> Router<Arc<AppState>> {
    use handlers::organizations::*;

    Router::new()
        .route(
            &api("/organizations"),
            post(create_organization).get(list_organizations),
        )
        .route(
            &api("/organizations/{id}"),
            get(get_organization).delete(delete_organization),
        )
        .route(
            &api("/organizations/{id}/status"),
            put(update_organization_status),
        )
        .route(&api("/employees"), post(create_employee).get(list_employees))
        .route(&api("/employees/{id}"), delete(delete_employee))
        .route(&api("/users"), get(list_users))
        .route(&api("/portal-admins"), get(list_portal_admins))
}

pub fn availability_routes() -> Router<Arc<AppState>> {
    use handlers::availability::*;

    Router::new()
        .route(
            &api("/organizations/{id}/courses"),
            put(replace_organization_courses).post(assign_course_to_organization),
        )
        .route(
            &api("/organizations/{id}/courses/{course_id}"),
            delete(unassign_course_from_organization),
        )
        .route(
            &api("/organizations/{id}/courses/{course_id}/assign-all"),
            post(assign_course_to_all_employees),
        )
        .route(
            &api("/employees/{id}/courses"),
            post(assign_course_to_employee),
        )
        .route(
            &api("/employees/{id}/courses/{course_id}"),
            delete(unassign_course_from_employee),
        )
        .route(&api("/portal/courses"), get(portal_course_catalog))
        .route(
            &api("/portal/courses/{id}/assignees"),
            get(list_course_assignees),
        )
}

pub fn catalog_routes() -> Router<Arc<AppState>> {
    use handlers::catalog::*;

    Router::new()
        .route(&api("/courses"), post(create_course).get(list_courses))
        .route(&api("/courses/{id}"), get(get_course).delete(delete_course))
        .route(&api("/courses/{id}/modules"), post(create_module))
        .route(&api("/modules/{id}/contents"), post(create_content))
        .route(
            &api("/contents/{id}/questions"),
            get(admin_quiz).post(create_question),
        )
        .route(
            &api("/questions/{id}/options"),
            put(replace_question_options),
        )
}

pub fn learning_routes() -> Router<Arc<AppState>> {
    use handlers::learning::*;

    Router::new()
        .route(&api("/me/courses"), get(my_courses))
        .route(&api("/me/courses/{id}"), get(my_course_detail))
        .route(&api("/me/contents/{id}"), get(my_content))
        .route(
            &api("/contents/{id}/interactions"),
            post(record_interaction),
        )
        .route(&api("/quizzes/{id}"), get(employee_quiz))
        .route(&api("/quizzes/{id}/submissions"), post(submit_quiz))
}

pub fn course_request_routes() -> Router<Arc<AppState>> {
    use handlers::course_requests::*;

    Router::new()
        .route(
            &api("/course-requests"),
            post(create_course_request).get(list_course_requests),
        )
        .route(&api("/course-requests/mine"), get(my_course_requests))
        .route(
            &api("/course-requests/{id}/resolve"),
            post(resolve_course_request),
        )
}

pub fn statistics_routes() -> Router<Arc<AppState>> {
    use handlers::statistics::*;

    Router::new()
        .route(&api("/statistics"), get(statistics))
        .route(&api("/organizations/{id}/report"), get(organization_report))
        .route(
            &api("/progress/{user_id}/{course_id}/risk-score"),
            put(set_risk_score),
        )
}
