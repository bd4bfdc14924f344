use serde::{Deserialize, Serialize};

/// A video descriptor as consumed from the search provider.
///
/// The cache treats this as an opaque payload; only `id` is inspected, for
/// deduplication in feed synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub channel_title: String,
    pub published_at: String,
}

impl Video {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        thumbnail_url: impl Into<String>,
        channel_title: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
            channel_title: channel_title.into(),
            published_at: published_at.into(),
        }
    }
}
