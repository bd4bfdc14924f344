use serde::Serialize;

use crate::models::video::Video;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<Video>,

    /// Whether the results were served from the personalization cache.
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedDto {
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct RecentSearchesDto {
    pub queries: Vec<String>,
}
