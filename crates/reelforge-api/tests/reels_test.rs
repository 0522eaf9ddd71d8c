//! Handler contract tests over in-memory storage and fake pipeline
//! capabilities.

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use helpers::{test_app, FailingScript, FakeScript};
use reelforge_storage::Storage;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

fn post_generate(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/reels/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_generate_rejects_missing_name() {
    let app = test_app(Arc::new(FakeScript));

    let response = app
        .router
        .clone()
        .oneshot(post_generate(r#"{}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(
        json.get("error").and_then(Value::as_str),
        Some("Missing celebrityName")
    );

    assert_eq!(app.storage.object_count(), 0);
}

#[tokio::test]
async fn test_generate_rejects_blank_name() {
    let app = test_app(Arc::new(FakeScript));

    let response = app
        .router
        .clone()
        .oneshot(post_generate(r#"{"celebrityName": "   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_persists_one_reel_and_reports_success() {
    let app = test_app(Arc::new(FakeScript));

    let response = app
        .router
        .clone()
        .oneshot(post_generate(r#"{"celebrityName": "Serena Williams"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json.get("success").and_then(Value::as_bool), Some(true));
    // The response carries no reel payload.
    assert!(json.get("reel").is_none());

    let reel_keys = app.storage.keys_with_prefix("reels/");
    assert_eq!(reel_keys.len(), 1);
    assert_eq!(
        app.storage.download(&reel_keys[0]).await.unwrap(),
        b"merged-video"
    );
}

#[tokio::test]
async fn test_generate_maps_pipeline_failure_to_500() {
    let app = test_app(Arc::new(FailingScript));

    let response = app
        .router
        .clone()
        .oneshot(post_generate(r#"{"celebrityName": "Serena Williams"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(
        json.get("error").and_then(Value::as_str),
        Some("Failed to generate and upload reel")
    );

    assert!(app.storage.keys_with_prefix("reels/").is_empty());
}

#[tokio::test]
async fn test_feed_on_empty_store() {
    let app = test_app(Arc::new(FakeScript));

    let response = app
        .router
        .clone()
        .oneshot(get("/api/reels?limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["reels"].as_array().unwrap().len(), 0);
    assert_eq!(json["pagination"]["hasMore"], Value::Bool(false));
    assert!(json["pagination"].get("nextToken").is_none());
    assert_eq!(
        json.get("message").and_then(Value::as_str),
        Some("No videos available at this time. Please try again later.")
    );
}

#[tokio::test]
async fn test_feed_serves_generated_reel_with_camel_case_fields() {
    let app = test_app(Arc::new(FakeScript));

    app.router
        .clone()
        .oneshot(post_generate(r#"{"celebrityName": "Serena Williams"}"#))
        .await
        .unwrap();

    let response = app.router.clone().oneshot(get("/api/reels")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let reels = json["reels"].as_array().unwrap();
    assert_eq!(reels.len(), 1);

    let item = &reels[0];
    assert!(item.get("videoUrl").is_some());
    assert!(item.get("createdAt").is_some());
    assert!(item.get("caption").is_some());
    assert!(item.get("likes").is_some());
    assert!(item.get("comments").is_some());
    assert!(item.get("video_url").is_none());

    assert_eq!(json["pagination"]["page"], Value::from(1));
    assert_eq!(json["pagination"]["hasMore"], Value::Bool(false));
}

#[tokio::test]
async fn test_feed_pagination_token_round_trip() {
    let app = test_app(Arc::new(FakeScript));
    for i in 0..5 {
        app.storage
            .upload(&format!("reels/{:02}.mp4", i), "video/mp4", vec![0])
            .await
            .unwrap();
    }

    let response = app
        .router
        .clone()
        .oneshot(get("/api/reels?limit=2"))
        .await
        .unwrap();
    let first = body_json(response).await;
    assert_eq!(first["reels"].as_array().unwrap().len(), 2);
    assert_eq!(first["pagination"]["hasMore"], Value::Bool(true));
    let token = first["pagination"]["nextToken"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/reels?limit=2&page=2&token={}", token)))
        .await
        .unwrap();
    let second = body_json(response).await;
    assert_eq!(second["pagination"]["page"], Value::from(2));

    let ids = |page: &Value| {
        page["reels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), vec!["00", "01"]);
    assert_eq!(ids(&second), vec!["02", "03"]);
}

#[tokio::test]
async fn test_feed_session_shuffle_keeps_the_id_set() {
    let app = test_app(Arc::new(FakeScript));
    for i in 0..8 {
        app.storage
            .upload(&format!("reels/{:02}.mp4", i), "video/mp4", vec![0])
            .await
            .unwrap();
    }

    let plain = body_json(
        app.router
            .clone()
            .oneshot(get("/api/reels?limit=8"))
            .await
            .unwrap(),
    )
    .await;
    let shuffled = body_json(
        app.router
            .clone()
            .oneshot(get("/api/reels?limit=8&session=abc123"))
            .await
            .unwrap(),
    )
    .await;

    let mut plain_ids: Vec<String> = plain["reels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    let mut shuffled_ids: Vec<String> = shuffled["reels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    plain_ids.sort();
    shuffled_ids.sort();
    assert_eq!(plain_ids, shuffled_ids);
}

#[tokio::test]
async fn test_options_on_reels_collection() {
    let app = test_app(Arc::new(FakeScript));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/reels")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Arc::new(FakeScript));

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.get("status").and_then(Value::as_str), Some("ok"));
}
