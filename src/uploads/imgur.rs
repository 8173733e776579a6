use crate::uploads::traits::ImageHost;
use crate::uploads::{ImageFile, ImageProvider, UploadTarget};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const ENDPOINT: &str = "https://api.imgur.com/3/image";

#[derive(Debug, Deserialize)]
struct ImgurResponse {
    data: ImgurImage,
}

#[derive(Debug, Deserialize)]
struct ImgurImage {
    link: String,
}

/// Anonymous Imgur uploads. Imgur has no folders, so the listing ID
/// travels in the image title and description instead.
pub struct ImgurHost {
    client: Client,
    client_id: String,
}

impl ImgurHost {
    pub fn new(client_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, client_id })
    }
}

#[async_trait]
impl ImageHost for ImgurHost {
    async fn upload(&self, file: &ImageFile, target: &UploadTarget) -> Result<String> {
        if self.client_id.trim().is_empty() {
            anyhow::bail!("Imgur configuration missing");
        }

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .context("Invalid image content type")?;
        let mut form = Form::new().part("image", part).text("type", "file");

        if let Some(id) = &target.listing_id {
            form = form
                .text("title", format!("property-{}", id))
                .text(
                    "description",
                    format!(
                        "listing={} role={}",
                        id,
                        target.role.map(|r| r.as_str()).unwrap_or("unspecified")
                    ),
                );
        }

        let response = self
            .client
            .post(ENDPOINT)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await
            .context("Failed to reach Imgur")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to upload to Imgur: {}", response.status());
        }

        let body: ImgurResponse = response
            .json()
            .await
            .context("Failed to parse Imgur response")?;
        info!("Imgur upload complete: {}", body.data.link);
        Ok(body.data.link)
    }

    fn provider(&self) -> ImageProvider {
        ImageProvider::Imgur
    }
}
