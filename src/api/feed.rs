use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, FeedDto};

#[derive(Debug, Deserialize)]
pub struct FeedRequest {
    pub user: Option<String>,

    /// Forces a random fallback feed, bypassing personalization.
    pub refresh: Option<bool>,
}

pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FeedRequest>,
) -> Json<ApiResponse<FeedDto>> {
    let videos = state
        .cache
        .get_personalized_videos(request.user.as_deref(), request.refresh.unwrap_or(false));

    Json(ApiResponse::success(FeedDto { videos }))
}

pub async fn get_trending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FeedDto>>, ApiError> {
    let videos = state
        .youtube
        .trending()
        .await
        .map_err(|e| ApiError::youtube_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(FeedDto { videos })))
}
