pub mod routes;
pub mod upload;

use crate::state::AppState;
use axum::http::{request::Parts, HeaderValue};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full HTTP surface. The handlers are thin: each one calls a single core function.
pub fn router(state: Arc<AppState>) -> axum::Router {
    let cors = cors_layer(&state.config.cors_origins);

    axum::Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/api/upload", post(upload::upload_file))
        .route("/api/sample-data/{scenario}", get(routes::get_sample_data))
        .route("/api/saturation/{scenario}", get(routes::get_saturation))
        .route("/api/simulate/{scenario}", post(routes::simulate_budget))
        .route("/api/optimize/{scenario}", get(routes::optimize_budget))
        .route("/api/counters", get(routes::get_counters))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A lone `*` allows any origin (without credentials); otherwise the listed
/// origins are matched exactly or by `scheme://*.domain` wildcard.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let patterns = origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin
                .to_str()
                .map(|o| patterns.iter().any(|p| origin_matches(p, o)))
                .unwrap_or(false)
        }))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once("://*.") {
        Some((scheme, domain)) => {
            let Some(host) = origin.strip_prefix(scheme).and_then(|r| r.strip_prefix("://")) else {
                return false;
            };
            host.strip_suffix(domain)
                .and_then(|sub| sub.strip_suffix('.'))
                .is_some_and(|sub| !sub.is_empty() && !sub.contains('/'))
        }
        None => pattern == origin,
    }
}
