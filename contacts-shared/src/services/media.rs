/// Avatar image hosting
///
/// `CloudinaryMedia` performs a signed upload to Cloudinary's image upload
/// endpoint. Avatars are stored under a fixed public id per user, so a new
/// upload replaces the previous image

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::env;
use std::time::Duration;

/// Folder avatars are uploaded into
pub const AVATAR_FOLDER: &str = "avatars";

/// Server-side crop applied to every avatar
pub const AVATAR_TRANSFORMATION: &str = "c_fill,h_200,w_200";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("upload response had no secure_url")]
    MissingUrl,

    #[error("media hosting is not configured")]
    NotConfigured,
}

/// Stores an avatar image and returns its public URL
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload_avatar(
        &self,
        user_id: i64,
        data: Bytes,
        filename: &str,
    ) -> Result<String, MediaError>;
}

/// Cloudinary account credentials
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// Reads `CLOUDINARY_*` variables; `None` if any is missing or empty
    pub fn from_env() -> Option<Self> {
        let read = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        Some(Self {
            cloud_name: read("CLOUDINARY_CLOUD_NAME")?,
            api_key: read("CLOUDINARY_API_KEY")?,
            api_secret: read("CLOUDINARY_API_SECRET")?,
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Cloudinary-backed avatar store
#[derive(Debug, Clone)]
pub struct CloudinaryMedia {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryMedia {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("contacts-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }
}

/// Signs upload parameters
///
/// Parameters are sorted by name, joined as `k=v&k=v`, suffixed with the API
/// secret and hashed with SHA-256
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMedia {
    async fn upload_avatar(
        &self,
        user_id: i64,
        data: Bytes,
        filename: &str,
    ) -> Result<String, MediaError> {
        let params = vec![
            ("folder", AVATAR_FOLDER.to_string()),
            ("overwrite", "true".to_string()),
            ("public_id", format!("avatar_{}", user_id)),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
            ("transformation", AVATAR_TRANSFORMATION.to_string()),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        let file = Part::bytes(data.to_vec()).file_name(filename.to_string());
        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (name, value) in params {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        let url = uploaded.secure_url.ok_or(MediaError::MissingUrl)?;

        tracing::debug!(user_id, url = %url, "Avatar uploaded");
        Ok(url)
    }
}

/// Media store used when Cloudinary is not configured; every upload fails
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMedia;

#[async_trait]
impl MediaStore for DisabledMedia {
    async fn upload_avatar(
        &self,
        _user_id: i64,
        _data: Bytes,
        _filename: &str,
    ) -> Result<String, MediaError> {
        Err(MediaError::NotConfigured)
    }
}
