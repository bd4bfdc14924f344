use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tracing::info;

use super::{ApiResponse, AppState};
use super::search::UserScope;

/// Privacy action: drops both the entry set and the recency list for the
/// scope. Irreversible.
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<UserScope>,
) -> Json<ApiResponse<()>> {
    let user = scope.user.as_deref();
    state.cache.clear_user_cache(user);
    info!("Cleared cache for {}", user.unwrap_or("anonymous"));

    Json(ApiResponse::success(()))
}
