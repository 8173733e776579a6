use crate::uploads::traits::ImageHost;
use crate::uploads::{ImageFile, ImageProvider, UploadTarget};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Root folder every listing image lands under
pub const ROOT_FOLDER: &str = "real-estate-properties";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    /// Unsigned upload preset from the Cloudinary dashboard
    pub upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: Option<String>,
    folder: Option<String>,
}

/// Unsigned uploads to Cloudinary, foldered and tagged by listing ID
pub struct CloudinaryHost {
    client: Client,
    config: CloudinaryConfig,
    endpoint: String,
}

impl CloudinaryHost {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let endpoint = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        );
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    fn is_configured(&self) -> bool {
        !self.config.cloud_name.trim().is_empty() && !self.config.upload_preset.trim().is_empty()
    }
}

/// Folder for a listing's images; unassigned uploads go to `temp`
pub fn folder_for(target: &UploadTarget) -> String {
    match &target.listing_id {
        Some(id) => format!("{}/{}", ROOT_FOLDER, id),
        None => format!("{}/temp", ROOT_FOLDER),
    }
}

pub fn tags_for(target: &UploadTarget) -> Vec<String> {
    let mut tags = vec!["real-estate".to_string(), "property".to_string()];
    if let Some(id) = &target.listing_id {
        tags.push(format!("property-{}", id));
    }
    if let Some(role) = target.role {
        tags.push(role.as_str().to_string());
    }
    tags
}

pub fn public_id_for(target: &UploadTarget, millis: i64) -> Option<String> {
    match (&target.listing_id, target.role) {
        (Some(id), Some(role)) => Some(format!("{}_{}_{}", id, role.as_str(), millis)),
        _ => None,
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, file: &ImageFile, target: &UploadTarget) -> Result<String> {
        if !self.is_configured() {
            anyhow::bail!("Cloudinary configuration missing");
        }

        let folder = folder_for(target);
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .context("Invalid image content type")?;

        let mut form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", folder.clone())
            .text("tags", tags_for(target).join(","));

        if let Some(public_id) = public_id_for(target, Utc::now().timestamp_millis()) {
            debug!("Uploading with public_id {} to folder {}", public_id, folder);
            form = form.text("public_id", public_id);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach Cloudinary")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to upload to Cloudinary: {}", response.status());
        }

        let body: UploadResponse = response
            .json()
            .await
            .context("Failed to parse Cloudinary response")?;

        info!(
            url = %body.secure_url,
            public_id = ?body.public_id,
            folder = ?body.folder,
            "Cloudinary upload complete"
        );
        Ok(body.secure_url)
    }

    fn provider(&self) -> ImageProvider {
        ImageProvider::Cloudinary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::ImageRole;

    #[test]
    fn listing_uploads_are_foldered_and_tagged_by_id() {
        let target = UploadTarget::for_listing("abc123", ImageRole::Gallery);
        assert_eq!(folder_for(&target), "real-estate-properties/abc123");
        assert_eq!(
            tags_for(&target),
            vec!["real-estate", "property", "property-abc123", "gallery"]
        );
        assert_eq!(
            public_id_for(&target, 1700000000000).as_deref(),
            Some("abc123_gallery_1700000000000")
        );
    }

    #[test]
    fn anonymous_uploads_go_to_temp() {
        let target = UploadTarget::default();
        assert_eq!(folder_for(&target), "real-estate-properties/temp");
        assert!(public_id_for(&target, 1).is_none());
    }

    #[tokio::test]
    async fn missing_configuration_is_an_error() {
        let host = CloudinaryHost::new(CloudinaryConfig {
            cloud_name: String::new(),
            upload_preset: String::new(),
        })
        .unwrap();
        let file = ImageFile::new("a.jpg", "image/jpeg", vec![1, 2, 3]);
        let err = host.upload(&file, &UploadTarget::default()).await.unwrap_err();
        assert!(err.to_string().contains("configuration missing"));
    }
}
