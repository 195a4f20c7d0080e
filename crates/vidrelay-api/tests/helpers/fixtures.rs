//! Request fixtures.

use axum_test::multipart::{MultipartForm, Part};

/// Ten bytes standing in for a video file.
pub fn dummy_video() -> Vec<u8> {
    b"0123456789".to_vec()
}

pub fn video_part(file_name: &str) -> Part {
    Part::bytes(dummy_video())
        .file_name(file_name)
        .mime_type("video/mp4")
}

/// Complete upload form for `platform`.
pub fn upload_form(title: &str, platform: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title)
        .add_text("tags", "#demo #test")
        .add_text("platform", platform)
        .add_text("shopee", "https://shopee.example/item/1")
        .add_text("lazada", "")
        .add_part("video", video_part("clip.mp4"))
}
