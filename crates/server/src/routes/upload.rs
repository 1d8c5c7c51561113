use axum::extract::{Multipart, State};
use axum::Json;
use service::media::UploadedMedia;
use tracing::{debug, warn};

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Multipart form with a required `file` field; other fields are ignored.
#[utoipa::path(
    post,
    path = "/testimonials/upload",
    tag = "testimonials",
    request_body(content = crate::openapi::UploadDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored upload", body = crate::openapi::UploadedMediaDoc),
        (status = 400, description = "Missing file, wrong type or too large", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedMedia>, JsonApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "malformed multipart body");
        JsonApiError::bad_request(format!("invalid multipart body: {}", e.body_text()))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| JsonApiError::bad_request(format!("failed to read upload: {}", e.body_text())))?;
        // stored name and type come from the validated content type only
        debug!(%file_name, %content_type, "upload received");
        let saved = state.uploads.save(&content_type, &data).await?;
        return Ok(Json(saved));
    }
    Err(JsonApiError::bad_request("file is required"))
}
