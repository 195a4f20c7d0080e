mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::upload_form;
use helpers::setup_test_app;
use serde_json::{json, Value};

#[tokio::test]
async fn test_list_videos_empty() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/videos").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "videos": [] }));
}

#[tokio::test]
async fn test_list_videos_is_idempotent() {
    let app = setup_test_app().await;
    for title in ["first", "second", "third"] {
        app.client()
            .post("/api/upload")
            .multipart(upload_form(title, "file-host"))
            .await
            .assert_status_ok();
    }

    let first: Value = app.client().get("/api/videos").await.json();
    let second: Value = app.client().get("/api/videos").await.json();

    assert_eq!(first, second);
    let titles: Vec<&str> = first["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_list_videos_reads_existing_file() {
    let app = setup_test_app().await;
    let existing = json!([
        {
            "id": 1700000000,
            "title": "Legacy",
            "video_url": "https://gofile.io/d/abc",
            "source": "gofile",
            "tags": "#old",
            "date": "2023-11-14T22:13:20.123456",
            "shop_links": { "shopee": "", "lazada": "", "tiktok": "" },
            "line_url": "https://lin.ee/legacy"
        }
    ]);
    std::fs::write(&app.store_path, existing.to_string()).unwrap();

    let listed: Value = app.client().get("/api/videos").await.json();
    let video = &listed["videos"][0];
    assert_eq!(video["title"], "Legacy");
    assert_eq!(video["source"], "file-host");
    assert!(video["shop_links"]["shopee"].is_null());
}

#[tokio::test]
async fn test_corrupt_list_is_reported_empty() {
    let app = setup_test_app().await;
    std::fs::write(&app.store_path, "{ not json").unwrap();

    let response = app.client().get("/api/videos").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "videos": [] }));
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "ok", "message": "API is running" })
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/missing").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
