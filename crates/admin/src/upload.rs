//! Binary asset uploads to the third-party host.
//!
//! An upload is a single multipart POST against a fixed endpoint derived
//! from the configured account name; the server-side `upload_preset`
//! carries the upload policy. There is no structured error contract - any
//! failure surfaces as a generic [`UploadError`] and the caller aborts
//! whatever compound mutation the upload was the first half of.

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::AssetHostConfig;

/// Errors that can occur while uploading an asset.
#[derive(Debug, Error)]
pub enum UploadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The asset host answered with a non-success status.
    #[error("Upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A binary file selected by the operator for upload.
#[derive(Debug, Clone)]
pub struct AssetFile {
    /// Original filename, forwarded to the host.
    pub filename: String,
    /// MIME type (e.g., `image/png`).
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// A successfully hosted asset.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    /// Public HTTPS URL of the hosted asset.
    pub secure_url: String,
}

/// Upload capability consumed by the mutation pipeline.
///
/// Exists as a seam so the pipeline can be exercised without network
/// access; [`AssetHostClient`] is the production implementation.
#[allow(async_fn_in_trait)]
pub trait AssetUpload: Send + Sync + 'static {
    /// Upload one file and return its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] when the host rejects or fails the upload.
    async fn upload(&self, file: &AssetFile) -> Result<UploadedAsset, UploadError>;
}

/// HTTP client for the asset host's unsigned upload endpoint.
#[derive(Debug, Clone)]
pub struct AssetHostClient {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl AssetHostClient {
    /// Create a client from the asset host section of the admin config.
    #[must_use]
    pub fn new(config: &AssetHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                config.cloud_name
            ),
            upload_preset: config.upload_preset.clone(),
        }
    }
}

impl AssetUpload for AssetHostClient {
    #[instrument(skip(self, file), fields(filename = %file.filename, bytes = file.bytes.len()))]
    async fn upload(&self, file: &AssetFile) -> Result<UploadedAsset, UploadError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self.http.post(&self.upload_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let asset: UploadedAsset = response.json().await?;
        tracing::info!(secure_url = %asset.secure_url, "Asset uploaded");
        Ok(asset)
    }
}
