//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains).

mod domains;

use crate::api_doc::ApiDoc;
use crate::auth::{auth_middleware, AuthState, JwtVerifier};
use crate::constants::MAX_REQUEST_BODY_BYTES;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use learnhub_core::Config;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = AuthState {
        verifier: JwtVerifier::from_config(config),
        directory: state.services.directory.clone(),
    };

    let public_routes =
        Router::new().route("/health", get(handlers::health::health_check));

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    let app = public_routes
        .merge(protected_routes)
        .merge(RapiDoc::with_openapi("/api/openapi.json", ApiDoc::openapi()).path("/docs"))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(domains::organization_routes())
        .merge(domains::availability_routes())
        .merge(domains::catalog_routes())
        .merge(domains::learning_routes())
        .merge(domains::course_request_routes())
        .merge(domains::statistics_routes())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(CORS_METHODS)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(CORS_METHODS)
            .allow_headers(Any)
    };
    Ok(cors)
}
