//! Route configuration and setup.
//!
//! API routes live under [`API_PREFIX`]; stored files are served read-only under
//! `/uploads` and `/converted`; health checks are in [health](health).

pub mod health;

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use mediaconv_core::Config;
use mediaconv_infra::request_id_middleware;
use mediaconv_storage::StorageArea;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let http_concurrency_limit = config.http_concurrency_limit().max(1);
    tracing::info!(
        http_concurrency_limit,
        body_limit_bytes = body_limit,
        "HTTP limits configured"
    );

    let app = api_routes()
        .merge(static_routes(&state))
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/health", API_PREFIX),
            get(health::health_check),
        )
        .route(
            &format!("{}/formats", API_PREFIX),
            get(handlers::formats::list_formats),
        )
        .route(
            &format!("{}/convert", API_PREFIX),
            post(handlers::convert_image::convert_image),
        )
        .route(
            &format!("{}/convert-audio", API_PREFIX),
            post(handlers::convert_audio::convert_audio),
        )
        .route(
            &format!("{}/upload", API_PREFIX),
            post(handlers::upload::upload_file),
        )
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Read-only mounts of both storage directories. `ServeDir` rejects traversal and answers
/// 404 for missing files.
fn static_routes(state: &AppState) -> Router<Arc<AppState>> {
    [StorageArea::Incoming, StorageArea::Converted]
        .into_iter()
        .fold(Router::new(), |router, area| {
            router.nest_service(area.url_prefix(), ServeDir::new(state.storage.dir(area)))
        })
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
