//! Captured-media review and upload
//!
//! The upload path reads the asset into a single in-memory blob and hands it
//! to an [`UploadSink`]. Where the bytes go (object storage, a server, a
//! folder) is the sink's business; retries and progress are too.

use crate::errors::CameraError;
use crate::types::{AssetKind, CapturedAsset, PhotoFile};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the review screen renders for the current asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub asset: CapturedAsset,
    pub captured_at: DateTime<Utc>,
    /// Pixel size for photos, when known
    pub dimensions: Option<(u32, u32)>,
    pub looping: bool,
    pub native_controls: bool,
    pub can_upload: bool,
}

impl ReviewView {
    pub fn for_asset(asset: CapturedAsset, captured_at: DateTime<Utc>) -> Self {
        match &asset {
            CapturedAsset::Photo(photo) => {
                let dimensions =
                    (photo.width > 0 && photo.height > 0).then_some((photo.width, photo.height));
                Self {
                    asset,
                    captured_at,
                    dimensions,
                    looping: false,
                    native_controls: false,
                    can_upload: true,
                }
            }
            CapturedAsset::Video(_) => Self {
                asset,
                captured_at,
                dimensions: None,
                looping: true,
                native_controls: true,
                can_upload: true,
            },
        }
    }
}

/// Fill in a photo's pixel size from the file header when the plugin left
/// it out. The header read runs on the blocking pool.
pub async fn with_header_dimensions(mut photo: PhotoFile) -> PhotoFile {
    if photo.width > 0 && photo.height > 0 {
        return photo;
    }

    let path = photo.path.clone();
    match tokio::task::spawn_blocking(move || image::image_dimensions(path)).await {
        Ok(Ok((width, height))) => {
            photo.width = width;
            photo.height = height;
        }
        Ok(Err(e)) => log::debug!("No dimensions for {}: {}", photo.path.display(), e),
        Err(e) => log::warn!("Dimension read task failed: {}", e),
    }
    photo
}

/// One blob handed to an upload destination
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: &'static str,
    pub kind: AssetKind,
    pub data: Bytes,
}

/// External transfer collaborator
#[async_trait]
pub trait UploadSink: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<(), CameraError>;
}

/// Upload an asset. `None` is a silent no-op and returns `Ok(false)`.
pub async fn upload(
    asset: Option<&CapturedAsset>,
    sink: &dyn UploadSink,
) -> Result<bool, CameraError> {
    let Some(asset) = asset else {
        log::debug!("Upload requested with no asset under review");
        return Ok(false);
    };

    let data = read_blob(asset.path()).await?;
    let request = UploadRequest {
        file_name: file_name_of(asset.path()),
        content_type: content_type_for(asset),
        kind: asset.kind(),
        data,
    };

    log::info!(
        "Uploading {} ({} bytes, {})",
        request.file_name,
        request.data.len(),
        request.content_type
    );
    sink.upload(request).await?;
    Ok(true)
}

/// Read a captured file into memory
pub async fn read_blob(path: &Path) -> Result<Bytes, CameraError> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        CameraError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(Bytes::from(data))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string())
}

/// MIME type from the file extension, falling back on the asset kind
pub fn content_type_for(asset: &CapturedAsset) -> &'static str {
    let ext = asset
        .path()
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match (ext.as_deref(), asset.kind()) {
        (Some("jpg") | Some("jpeg"), _) => "image/jpeg",
        (Some("png"), _) => "image/png",
        (Some("heic"), _) => "image/heic",
        (Some("mp4"), _) => "video/mp4",
        (Some("mov"), _) => "video/quicktime",
        (_, AssetKind::Photo) => "image/jpeg",
        (_, AssetKind::Video) => "video/mp4",
    }
}

/// Sink that writes each blob into a local directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl UploadSink for DirectorySink {
    async fn upload(&self, request: UploadRequest) -> Result<(), CameraError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            CameraError::UploadFailure(format!("Failed to create {}: {}", self.root.display(), e))
        })?;

        let target = self.root.join(&request.file_name);
        tokio::fs::write(&target, &request.data).await.map_err(|e| {
            CameraError::UploadFailure(format!("Failed to write {}: {}", target.display(), e))
        })?;

        log::debug!("Stored {} bytes at {}", request.data.len(), target.display());
        Ok(())
    }
}
