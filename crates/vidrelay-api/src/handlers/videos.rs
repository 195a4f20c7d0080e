use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use vidrelay_core::UploadRecord;

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<UploadRecord>,
}

/// `GET /api/videos`, most recent first.
///
/// An unreadable store is reported as an empty list.
pub async fn list_videos(State(state): State<Arc<AppState>>) -> Json<VideoListResponse> {
    let videos = match state.store.load().await {
        Ok(snapshot) => snapshot.records,
        Err(e) => {
            tracing::warn!(
                error = %e,
                backend = %state.store.backend_type(),
                "Failed to load upload list, returning empty list"
            );
            Vec::new()
        }
    };

    Json(VideoListResponse { videos })
}
