use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ApiError, ApiResponse, AppState, RecentSearchesDto, SearchResults};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserScope {
    pub user: Option<String>,
}

/// Cache-consulted search: serves a fresh cached result set when one exists,
/// otherwise calls the provider and feeds the results back into the cache.
pub async fn search_videos(
    State(state): State<Arc<AppState>>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let query = request.q.trim();
    if query.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }

    let user = request.user.as_deref();

    if let Some(results) = state.cache.get_cached_results(query, user) {
        debug!("Cache hit for '{}'", query);
        return Ok(Json(ApiResponse::success(SearchResults {
            results,
            cached: true,
        })));
    }

    info!("Searching provider for '{}'", query);
    let results = state
        .youtube
        .search(query)
        .await
        .map_err(|e| ApiError::youtube_error(e.to_string()))?;

    state.cache.cache_search_results(query, &results, user);

    Ok(Json(ApiResponse::success(SearchResults {
        results,
        cached: false,
    })))
}

pub async fn recent_searches(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<UserScope>,
) -> Json<ApiResponse<RecentSearchesDto>> {
    let queries = state.cache.get_recent_searches(scope.user.as_deref());
    Json(ApiResponse::success(RecentSearchesDto { queries }))
}
