//! OpenAPI documentation.
//! Request and response schemas referenced by handler annotations are collected
//! automatically; only shared types are listed explicitly.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use learnhub_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LearnHub API",
        version = "0.1.0",
        description = "Multi-tenant learning management API: organizations, course availability, content tracking, quizzes and progress reporting. All endpoints except /health are versioned under /api/v1/ and require a bearer token."
    ),
    paths(
        handlers::health::health_check,
        // Organizations
        handlers::organizations::create_organization,
        handlers::organizations::list_organizations,
        handlers::organizations::get_organization,
        handlers::organizations::update_organization_status,
        handlers::organizations::delete_organization,
        handlers::organizations::create_employee,
        handlers::organizations::list_employees,
        handlers::organizations::delete_employee,
        handlers::organizations::list_users,
        handlers::organizations::list_portal_admins,
        // Availability
        handlers::availability::replace_organization_courses,
        handlers::availability::assign_course_to_organization,
        handlers::availability::unassign_course_from_organization,
        handlers::availability::assign_course_to_all_employees,
        handlers::availability::assign_course_to_employee,
        handlers::availability::unassign_course_from_employee,
        handlers::availability::portal_course_catalog,
        handlers::availability::list_course_assignees,
        // Catalog
        handlers::catalog::create_course,
        handlers::catalog::list_courses,
        handlers::catalog::get_course,
        handlers::catalog::delete_course,
        handlers::catalog::create_module,
        handlers::catalog::create_content,
        handlers::catalog::admin_quiz,
        handlers::catalog::create_question,
        handlers::catalog::replace_question_options,
        // Learning
        handlers::learning::my_courses,
        handlers::learning::my_course_detail,
        handlers::learning::my_content,
        handlers::learning::record_interaction,
        handlers::learning::employee_quiz,
        handlers::learning::submit_quiz,
        // Course requests
        handlers::course_requests::create_course_request,
        handlers::course_requests::my_course_requests,
        handlers::course_requests::list_course_requests,
        handlers::course_requests::resolve_course_request,
        // Statistics
        handlers::statistics::statistics,
        handlers::statistics::organization_report,
        handlers::statistics::set_risk_score,
    ),
    components(schemas(
        error::ErrorResponse,
        models::UserRole,
        models::OrganizationStatus,
        models::CourseStatus,
        models::ContentType,
        models::RequestStatus,
        models::QuestionType,
    )),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "organizations", description = "Organizations and their portal admins"),
        (name = "employees", description = "Employee accounts within an organization"),
        (name = "users", description = "System-wide account directory"),
        (name = "course-availability", description = "Course assignment to organizations and employees"),
        (name = "portal", description = "Portal admin views of the organization catalog"),
        (name = "catalog", description = "Course, module, content and quiz authoring"),
        (name = "learning", description = "Employee courses, content interactions and quizzes"),
        (name = "course-requests", description = "Course purchase requests and their resolution"),
        (name = "statistics", description = "Statistics, progress reports and risk scores")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_versioned_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/health"));
        assert!(spec
            .paths
            .paths
            .contains_key("/api/v1/organizations/{id}/courses/{course_id}/assign-all"));
        assert!(spec.paths.paths.contains_key("/api/v1/quizzes/{id}/submissions"));
        assert!(spec.paths.paths.contains_key("/api/v1/me/contents/{id}"));
        assert!(spec.paths.paths.contains_key("/api/v1/portal-admins"));
        assert!(spec
            .paths
            .paths
            .keys()
            .all(|path| path == "/health" || path.starts_with(crate::constants::API_PREFIX)));
    }
}
