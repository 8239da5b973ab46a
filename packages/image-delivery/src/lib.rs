pub mod config;
pub mod delivery;
pub mod handler;
pub mod middleware;
pub mod response;
pub mod transform;

use axum::Router;
use axum::routing::get;
use image_core::ObjectBucket;
use std::sync::Arc;

/// サービス名（/health と起動ログで使う）
pub const SERVICE_NAME: &str = "image-delivery";

/// リクエスト間で共有する状態。起動後は変更しない
#[derive(Clone)]
pub struct AppState {
    pub bucket: Arc<dyn ObjectBucket>,
    pub public_base_url: Arc<str>,
}

impl AppState {
    pub fn new(bucket: Arc<dyn ObjectBucket>, public_base_url: &str) -> Self {
        Self {
            bucket,
            public_base_url: Arc::from(public_base_url.trim_end_matches('/')),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/cdn-cgi/image/{options}/{*key}", get(handler::transform))
        .route("/health", get(handler::health))
        .route("/info/{*key}", get(handler::info))
        .layer(axum::middleware::from_fn(
            middleware::request_tracing_middleware,
        ))
        .with_state(state)
}
