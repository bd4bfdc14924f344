use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::YouTubeConfig;
use crate::models::video::Video;

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
    channel_title: String,
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best_url(self) -> String {
        self.high
            .or(self.medium)
            .or(self.default)
            .map(|t| t.url)
            .unwrap_or_default()
    }
}

/// Client for a YouTube Data v3 shaped search/trending API.
///
/// With an empty API key it serves fixed demo items instead of calling out,
/// so the rest of the stack works without credentials.
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(
                config.request_timeout_seconds,
            )))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Video>> {
        if self.config.api_key.is_empty() {
            return Ok(demo_search_results());
        }

        let url = format!("{}/search", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", &self.config.max_results.to_string()),
                ("key", &self.config.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("YouTube API error: {} - {}", status, body));
        }

        let response: ListResponse<SearchItem> = response.json().await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| Video {
                id: item.id.video_id,
                title: item.snippet.title,
                thumbnail_url: item.snippet.thumbnails.best_url(),
                channel_title: item.snippet.channel_title,
                published_at: item.snippet.published_at,
            })
            .collect())
    }

    pub async fn trending(&self) -> Result<Vec<Video>> {
        if self.config.api_key.is_empty() {
            return Ok(demo_trending());
        }

        let url = format!("{}/videos", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("chart", "mostPopular"),
                ("maxResults", &self.config.max_results.to_string()),
                ("key", &self.config.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("YouTube API error: {} - {}", status, body));
        }

        let response: ListResponse<TrendingItem> = response.json().await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| Video {
                id: item.id,
                title: item.snippet.title,
                thumbnail_url: item.snippet.thumbnails.best_url(),
                channel_title: item.snippet.channel_title,
                published_at: item.snippet.published_at,
            })
            .collect())
    }
}

fn demo_search_results() -> Vec<Video> {
    vec![
        Video::new(
            "1",
            "BMW MD SONG | IBRAHIM ADAMS | OFFICIAL VIDEO",
            "https://img.youtube.com/vi/1/hqdefault.jpg",
            "Ibrahim Tech official",
            "2024-05-01T00:00:00Z",
        ),
        Video::new(
            "2",
            "Imran Khan - Amplifier (Official Music Video)",
            "https://img.youtube.com/vi/2/hqdefault.jpg",
            "imrankhanworld",
            "2020-02-18T00:00:00Z",
        ),
    ]
}

fn demo_trending() -> Vec<Video> {
    vec![
        Video::new(
            "1",
            "Trending Video 1",
            "https://img.youtube.com/vi/1/hqdefault.jpg",
            "Trending Channel 1",
            "2024-05-01T00:00:00Z",
        ),
        Video::new(
            "2",
            "Trending Video 2",
            "https://img.youtube.com/vi/2/hqdefault.jpg",
            "Trending Channel 2",
            "2024-05-02T00:00:00Z",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_maps_to_videos() {
        let json = r#"{
            "items": [{
                "id": { "videoId": "dQw4w9WgXcQ" },
                "snippet": {
                    "title": "Never Gonna Give You Up",
                    "thumbnails": { "high": { "url": "https://img.example/hq.jpg" } },
                    "channelTitle": "Official RickAstley",
                    "publishedAt": "1987-10-25T00:00:00Z"
                }
            }]
        }"#;

        let parsed: ListResponse<SearchItem> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].id.video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn missing_thumbnails_fall_back_to_empty_url() {
        let json = r#"{
            "items": [{
                "id": "abc",
                "snippet": {
                    "title": "t",
                    "channelTitle": "c",
                    "publishedAt": "2024-01-01T00:00:00Z"
                }
            }]
        }"#;

        let parsed: ListResponse<TrendingItem> = serde_json::from_str(json).unwrap();
        let snippet = parsed.items.into_iter().next().unwrap().snippet;
        assert_eq!(snippet.thumbnails.best_url(), "");
    }
}
