pub mod error;
pub mod health;
pub mod index;
pub mod response;
pub mod status;
pub mod stress;

use axum::{
    extract::{Request, State},
    http::{uri::PathAndQuery, Uri},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::{any::Any, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, normalize_path::NormalizePathLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::info;

use crate::{api::error::ApiError, config::ServerConfig, slot::AppState};

/// Routes listed on the startup banner, in `(method, path)` form.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/status"),
    ("GET", "/stress"),
    ("GET", "/health"),
    ("POST", "/reset"),
];

/// Full slot API. Paths are matched without regard to case or a trailing
/// slash, so `/STATUS/` reaches the same handler as `/status`.
pub fn router(state: AppState, cfg: &ServerConfig) -> Router {
    let app = with_layers(routes(state.clone()), state, cfg);
    Router::new().fallback_service(
        ServiceBuilder::new()
            .layer(NormalizePathLayer::trim_trailing_slash())
            .layer(middleware::map_request(fold_path_case))
            .service(app),
    )
}

/// Bare routes without middleware. A wrong method on a known path answers
/// like an unknown path.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index).fallback(not_found))
        .route("/status", get(status::get_status).fallback(not_found))
        .route("/health", get(health::health_check).fallback(not_found))
        .route("/stress", get(stress::simulate_load).fallback(not_found))
        .route("/reset", post(status::reset_statistics).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

/// Wraps `router` with request counting, panic recovery, timeout, CORS and
/// tracing. Every request passes the counter before reaching a handler.
pub fn with_layers(router: Router, state: AppState, cfg: &ServerConfig) -> Router {
    let identity: Arc<str> = Arc::from(state.identity());

    router
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
                    error::panic_response(&identity, panic)
                }))
                .layer(TimeoutLayer::new(cfg.request_timeout())),
        )
        .layer(middleware::from_fn_with_state(state, count_request))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn count_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let request_number = state.slot.record_request();
    info!(
        method = %request.method(),
        path = request.uri().path(),
        request_number,
        "request"
    );
    next.run(request).await
}

async fn fold_path_case(mut request: Request) -> Request {
    if let Some(uri) = lowercase_path(request.uri()) {
        *request.uri_mut() = uri;
    }
    request
}

fn lowercase_path(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    if !path.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let lowered = match uri.query() {
        Some(query) => format!("{}?{query}", path.to_ascii_lowercase()),
        None => path.to_ascii_lowercase(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(lowered).ok()?);
    Uri::from_parts(parts).ok()
}

async fn not_found(State(state): State<AppState>) -> ApiError {
    ApiError::not_found(state.identity())
}
