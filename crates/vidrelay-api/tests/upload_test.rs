mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use helpers::fakes::{FakeFileHost, FakeVideoPlatform};
use helpers::fixtures::{dummy_video, upload_form, video_part};
use helpers::{setup_test_app, TestAppBuilder, CONTACT_URL};
use serde_json::Value;

#[tokio::test]
async fn test_upload_to_file_host() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Demo", "file-host"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Video uploaded successfully");

    let video = &body["video"];
    assert_eq!(video["title"], "Demo");
    assert_eq!(video["source"], "file-host");
    assert!(video["video_url"]
        .as_str()
        .unwrap()
        .starts_with("https://gofile.io/d/"));
    assert_eq!(video["tags"], "#demo #test");
    assert_eq!(video["line_url"], CONTACT_URL);
    assert_eq!(video["shop_links"]["shopee"], "https://shopee.example/item/1");
    assert!(video["shop_links"]["lazada"].is_null());
    assert!(video.get("video_url_backup").is_none());
    assert!(video.get("source_backup").is_none());

    assert_eq!(app.video_platform.calls(), 0);
    let received = app.file_host.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "clip.mp4");
    assert_eq!(received[0].1, dummy_video());
}

#[tokio::test]
async fn test_demo_upload_is_listed_first() {
    let app = setup_test_app().await;

    app.client()
        .post("/api/upload")
        .multipart(upload_form("Earlier", "file-host"))
        .await
        .assert_status_ok();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Demo", "file-host"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let created: Value = response.json();

    let listed: Value = app.client().get("/api/videos").await.json();
    let videos = listed["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0], created["video"]);
    assert_eq!(videos[1]["title"], "Earlier");
    assert!(videos[0]["id"].as_u64().unwrap() > videos[1]["id"].as_u64().unwrap());
}

#[tokio::test]
async fn test_upload_both_uses_video_platform_as_primary() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Dual", "both"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let video = &body["video"];
    assert_eq!(video["source"], "video-platform");
    assert!(video["video_url"]
        .as_str()
        .unwrap()
        .starts_with("https://www.youtube.com/watch?v="));
    assert_eq!(video["source_backup"], "file-host");
    assert!(!video["video_url_backup"].as_str().unwrap().is_empty());

    assert_eq!(app.video_platform.calls(), 1);
    assert_eq!(app.file_host.calls(), 1);
    // both publishers read the whole file
    assert_eq!(app.file_host.received()[0].1, dummy_video());

    let details = app.video_platform.details();
    assert_eq!(details[0].title, "Dual");
    assert_eq!(details[0].tags, vec!["demo", "test"]);
    assert!(details[0].description.starts_with("Dual\n\n#demo #test\n"));
    assert!(details[0].description.contains(CONTACT_URL));
}

#[tokio::test]
async fn test_upload_video_platform_only() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Platform", "video-platform"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let video = &body["video"];
    assert_eq!(video["source"], "video-platform");
    assert!(video.get("source_backup").is_none());
    assert_eq!(app.file_host.calls(), 0);
}

#[tokio::test]
async fn test_upload_missing_file() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_text("title", "No file")
        .add_text("platform", "file-host");
    let response = app.client().post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No video file provided");
    assert_eq!(body["code"], "MISSING_FILE");
    assert_eq!(app.file_host.calls(), 0);
    assert!(app.stored_json().is_none());
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .form(&[("title", "Demo"), ("platform", "file-host")])
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No video file provided");
    assert_eq!(body["code"], "MISSING_FILE");
    assert_eq!(app.file_host.calls(), 0);
    assert!(app.stored_json().is_none());
}

#[tokio::test]
async fn test_upload_empty_file_name() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_text("title", "Unnamed")
        .add_part("video", video_part(""));
    let response = app.client().post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file selected");
    assert_eq!(app.file_host.calls(), 0);
    assert!(app.stored_json().is_none());
    assert_eq!(app.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_upload_missing_title() {
    let app = setup_test_app().await;

    for title in [None, Some("   ")] {
        let mut form = MultipartForm::new().add_part("video", video_part("clip.mp4"));
        if let Some(title) = title {
            form = form.add_text("title", title);
        }
        let response = app.client().post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "MISSING_TITLE");
    }

    assert_eq!(app.file_host.calls(), 0);
    assert!(app.stored_json().is_none());
    assert_eq!(app.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_upload_invalid_platform() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Demo", "vimeo"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].as_str().unwrap().contains("vimeo"));
    assert_eq!(app.file_host.calls(), 0);
    assert_eq!(app.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_upload_without_platform_credential() {
    let app = TestAppBuilder::new()
        .video_platform(FakeVideoPlatform::unauthorized())
        .build()
        .await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Demo", "video-platform"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "AUTHENTICATION_REQUIRED");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("authentication required"));

    assert!(app.stored_json().is_none());
    let listed: Value = app.client().get("/api/videos").await.json();
    assert!(listed["videos"].as_array().unwrap().is_empty());
    assert_eq!(app.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_backup_failure_aborts_record() {
    let app = TestAppBuilder::new()
        .file_host(FakeFileHost::failing("quota exceeded"))
        .build()
        .await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Dual", "both"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "PUBLISH_ERROR");
    assert!(body["error"].as_str().unwrap().contains("quota exceeded"));

    // the video platform already published, but no partial record is kept
    assert_eq!(app.video_platform.calls(), 1);
    assert!(app.stored_json().is_none());
    assert_eq!(app.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_store_failure_does_not_fail_upload() {
    let broken = tempfile::tempdir().unwrap();
    // a directory cannot be read as the list file
    let app = TestAppBuilder::new()
        .store_path(broken.path())
        .build()
        .await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("Demo", "file-host"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], true);

    let listed: Value = app.client().get("/api/videos").await.json();
    assert!(listed["videos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_temporary_files_left_behind() {
    let app = setup_test_app().await;

    app.client()
        .post("/api/upload")
        .multipart(upload_form("Kept", "both"))
        .await
        .assert_status_ok();
    app.client()
        .post("/api/upload")
        .multipart(MultipartForm::new().add_part("video", video_part("clip.mp4")))
        .await
        .assert_status_bad_request();

    assert_eq!(app.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_second_file_part_is_rejected() {
    let app = setup_test_app().await;

    let form = upload_form("Two files", "file-host").add_part("file", video_part("other.mp4"));
    let response = app.client().post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    assert_eq!(app.leftover_uploads(), 0);
}
