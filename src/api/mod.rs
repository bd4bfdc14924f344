use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::clients::youtube::YouTubeClient;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::services::{FallbackPool, PersonalizationCache};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

mod cache;
mod error;
mod feed;
mod search;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub cache: Arc<PersonalizationCache>,

    pub youtube: YouTubeClient,

    pub start_time: std::time::Instant,
}

pub fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let storage: Arc<dyn StorageBackend> = if config.general.data_path.is_empty() {
        Arc::new(MemoryStorage::new())
    } else {
        match FileStorage::new(&config.general.data_path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                warn!(
                    "Could not open data directory '{}', falling back to in-memory storage: {e}",
                    config.general.data_path
                );
                Arc::new(MemoryStorage::new())
            }
        }
    };

    let cache = Arc::new(PersonalizationCache::with_settings(
        storage,
        Arc::new(SystemClock),
        FallbackPool::demo(),
        config.cache.settings(),
    ));

    let youtube = YouTubeClient::new(config.youtube.clone())?;

    Ok(Arc::new(AppState {
        config,
        cache,
        youtube,
        start_time: std::time::Instant::now(),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/search", get(search::search_videos))
        .route("/searches/recent", get(search::recent_searches))
        .route("/feed", get(feed::get_feed))
        .route("/trending", get(feed::get_trending))
        .route("/cache", delete(cache::clear_cache))
        .route("/system/status", get(system::get_status))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
