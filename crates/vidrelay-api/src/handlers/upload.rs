use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::multipart::read_upload_form;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use vidrelay_core::UploadRecord;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub video: UploadRecord,
}

/// `POST /api/upload`
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("upload", request_id = %request_id);

    async move {
        let form = read_upload_form(multipart?, &state.temp_dir).await?;
        let request = form.into_request()?;
        let video = state.uploads.upload(request).await?;

        Ok::<_, HttpAppError>(Json(UploadResponse {
            success: true,
            message: "Video uploaded successfully".to_string(),
            video,
        }))
    }
    .instrument(span)
    .await
}
