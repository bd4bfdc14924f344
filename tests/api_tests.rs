//! Smoke tests for the web API flows the frontend uses.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use tubefeed::config::Config;

fn spawn_app() -> Router {
    let mut config = Config::default();
    // In-memory storage and demo provider data; no network, no disk.
    config.general.data_path = String::new();
    config.youtube.api_key = String::new();

    let state = tubefeed::api::create_app_state(config).expect("failed to create app state");
    tubefeed::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn search_misses_then_hits_cache() {
    let app = spawn_app();

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/search?q=lofi%20beats&user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let first_body = body_json(first).await;
    assert_eq!(first_body["success"], true);
    assert_eq!(first_body["data"]["cached"], false);
    assert!(!first_body["data"]["results"].as_array().unwrap().is_empty());

    let second = app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=LOFI%20BEATS&user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let second_body = body_json(second).await;
    assert_eq!(second_body["data"]["cached"], true);
    assert_eq!(
        second_body["data"]["results"],
        first_body["data"]["results"]
    );
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let app = spawn_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=%20%20")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn recent_searches_reflect_activity() {
    let app = spawn_app();

    for query in ["cats", "dogs"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/search?q={query}&user=alice"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/searches/recent?user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["queries"], serde_json::json!(["dogs", "cats"]));
}

#[tokio::test]
async fn feed_returns_bounded_video_list() {
    let app = spawn_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/feed?user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let videos = body["data"]["videos"].as_array().unwrap();
    assert!(!videos.is_empty());
    assert!(videos.len() <= 6);
}

#[tokio::test]
async fn trending_serves_provider_items() {
    let app = spawn_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/trending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(!body["data"]["videos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn clearing_cache_forgets_the_user() {
    let app = spawn_app();

    let search = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/search?q=cats&user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(search.status(), StatusCode::OK);

    let clear = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cache?user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(clear.status(), StatusCode::OK);

    let recent = app
        .oneshot(
            Request::builder()
                .uri("/api/searches/recent?user=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(recent).await;
    assert_eq!(body["data"]["queries"], serde_json::json!([]));
}
