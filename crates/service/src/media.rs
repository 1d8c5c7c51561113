//! Testimonial media: upload storage and the local-file to data-URL migration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use models::document::{self, Collection, Document, Filter};
use models::testimonial::MediaKind;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// Public URL prefix for stored testimonial uploads.
pub const UPLOAD_PREFIX: &str = "/uploads/testimonials/";
const UPLOAD_SUBDIR: &str = "testimonials";

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Upload types we store, with the extension the file is saved under.
/// The client's file name never picks the extension, so `/uploads` only
/// ever serves these types. SVG is excluded: it can carry script.
pub fn accepted_media(content_type: &str) -> Option<(MediaKind, &'static str)> {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some((MediaKind::Image, "jpg")),
        "image/png" => Some((MediaKind::Image, "png")),
        "image/gif" => Some((MediaKind::Image, "gif")),
        "image/webp" => Some((MediaKind::Image, "webp")),
        "video/mp4" => Some((MediaKind::Video, "mp4")),
        "video/webm" => Some((MediaKind::Video, "webm")),
        "video/quicktime" => Some((MediaKind::Video, "mov")),
        _ => None,
    }
}

pub fn to_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub data_url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Writes uploads below `<root>/testimonials`.
#[derive(Debug, Clone)]
pub struct MediaUploads {
    root: PathBuf,
    max_bytes: usize,
}

impl MediaUploads {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { root: root.into(), max_bytes }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<UploadedMedia, ServiceError> {
        let Some((kind, ext)) = accepted_media(content_type) else {
            return Err(ServiceError::Validation(
                "file must be a jpeg, png, gif or webp image or an mp4, webm or mov video".into(),
            ));
        };
        if bytes.is_empty() {
            return Err(ServiceError::Validation("file is empty".into()));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::Validation(format!(
                "file exceeds the {} byte upload limit",
                self.max_bytes
            )));
        }

        let dir = self.root.join(UPLOAD_SUBDIR);
        fs::create_dir_all(&dir).await.map_err(ServiceError::db)?;
        let name = format!("{}.{ext}", Uuid::new_v4());
        fs::write(dir.join(&name), bytes).await.map_err(ServiceError::db)?;
        let content_type = content_type_for(&name);
        info!(%name, %content_type, "media stored");

        Ok(UploadedMedia {
            url: format!("{UPLOAD_PREFIX}{name}"),
            data_url: to_data_url(content_type, bytes),
            kind,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub scanned: usize,
    pub updated: usize,
    pub failed_files: usize,
}

/// File name part of a local upload URL; `None` for anything that could
/// escape the uploads directory.
fn local_upload_name(url: &str) -> Option<&str> {
    let name = url.strip_prefix(UPLOAD_PREFIX)?;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    Some(name)
}

/// Inline every `/uploads/testimonials/<file>` media locator as a `data:`
/// URL. Unreadable files are logged and left as they are.
#[instrument(skip(store))]
pub async fn migrate_local_media(
    store: Arc<dyn DocumentStore>,
    uploads_root: &Path,
) -> Result<MigrationReport, ServiceError> {
    let mut report = MigrationReport::default();
    let dir = uploads_root.join(UPLOAD_SUBDIR);

    for doc in store.find_all(Collection::Testimonials).await? {
        report.scanned += 1;
        let Some(id) = document::id_of(&doc).map(str::to_string) else { continue };
        let Some(Value::Array(mut media)) = doc.get("media").cloned() else { continue };

        let mut changed = false;
        for item in media.iter_mut() {
            let Some(url) = item.get("url").and_then(Value::as_str) else { continue };
            let Some(name) = local_upload_name(url).map(str::to_string) else { continue };
            let path = dir.join(&name);
            match fs::read(&path).await {
                Ok(bytes) => {
                    item["url"] = Value::String(to_data_url(content_type_for(&name), &bytes));
                    changed = true;
                    info!(%id, %name, "converted upload to data URL");
                }
                Err(e) => {
                    report.failed_files += 1;
                    error!(%id, path = %path.display(), error = %e, "failed reading upload");
                }
            }
        }

        if changed {
            let mut set = Document::new();
            set.insert("media".into(), Value::Array(media));
            match store.find_one_and_update(Collection::Testimonials, &Filter::by_id(id.clone()), set).await? {
                Some(_) => report.updated += 1,
                None => warn!(%id, "testimonial vanished during migration"),
            }
        }
    }

    info!(scanned = report.scanned, updated = report.updated, failed = report.failed_files, "media migration complete");
    Ok(report)
}
