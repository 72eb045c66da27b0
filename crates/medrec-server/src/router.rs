use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use medrec_protocol::endpoints;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_identity;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all medrec endpoints.
///
/// Everything except the health check sits behind the auth middleware.
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let api = Router::new()
        .route(endpoints::DIAGNOSES, get(handler::list_diagnoses))
        .route(
            endpoints::PATIENTS,
            get(handler::list_patients).post(handler::add_patient),
        )
        .route(endpoints::PATIENT, get(handler::get_patient))
        .route(endpoints::ENTRIES, post(handler::add_entry))
        .route(
            endpoints::ENTRY,
            get(handler::get_entry).put(handler::update_entry),
        )
        .route(
            endpoints::VERSIONS,
            get(handler::list_versions).post(handler::create_version),
        )
        .route(endpoints::VERSION_DIFF, get(handler::version_diff))
        .route(endpoints::LATEST_VERSION, get(handler::latest_version))
        .route(endpoints::VERSION, get(handler::get_version))
        .route(endpoints::RESTORE_VERSION, put(handler::restore_version))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    let router = Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http());

    let router = if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.with_state(state)
}
