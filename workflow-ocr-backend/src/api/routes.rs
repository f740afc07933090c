use axum::extract::DefaultBodyLimit;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::app_api_auth_middleware;
use super::openapi;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/heartbeat", get(handlers::heartbeat))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router());

    let protected_routes = Router::new()
        .route("/process_ocr", post(handlers::ocr::process_ocr))
        .route(
            "/installed_languages",
            get(handlers::languages::installed_languages),
        )
        .route("/enabled", put(handlers::lifecycle::enabled))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            app_api_auth_middleware,
        ));

    // Uploads are bounded by MAX_UPLOAD_SIZE instead of axum's 2 MB default.
    let max_upload_bytes = state.config.server.max_upload_bytes;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
