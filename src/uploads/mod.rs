pub mod audit;
pub mod cloudinary;
pub mod imgur;
pub mod stock;
pub mod traits;

pub use cloudinary::{CloudinaryConfig, CloudinaryHost};
pub use imgur::ImgurHost;
pub use stock::{LocalHost, UnsplashHost};
pub use traits::ImageHost;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Served when an upload fails
pub const PLACEHOLDER_URL: &str = "/images/placeholder-property.jpg";

/// Image hosts selectable through configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    Local,
    Cloudinary,
    Imgur,
    Unsplash,
}

impl ImageProvider {
    /// Unknown tags select the local host
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cloudinary" => ImageProvider::Cloudinary,
            "imgur" => ImageProvider::Imgur,
            "unsplash" => ImageProvider::Unsplash,
            _ => ImageProvider::Local,
        }
    }
}

impl fmt::Display for ImageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageProvider::Local => "local",
            ImageProvider::Cloudinary => "cloudinary",
            ImageProvider::Imgur => "imgur",
            ImageProvider::Unsplash => "unsplash",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    Main,
    Gallery,
}

impl ImageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageRole::Main => "main",
            ImageRole::Gallery => "gallery",
        }
    }
}

/// An image file received from the admin form
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }
}

/// Which listing an upload belongs to, when known
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadTarget {
    pub listing_id: Option<String>,
    pub role: Option<ImageRole>,
}

impl UploadTarget {
    pub fn for_listing(listing_id: &str, role: ImageRole) -> Self {
        Self {
            listing_id: Some(listing_id.to_string()),
            role: Some(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    pub url: String,
    pub provider: ImageProvider,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Routes uploads to the host chosen at construction.
/// Failures come back as a placeholder result, never as an error.
#[derive(Clone)]
pub struct ImageUploader {
    host: Arc<dyn ImageHost>,
}

impl ImageUploader {
    pub fn new(host: Arc<dyn ImageHost>) -> Self {
        Self { host }
    }

    pub fn provider(&self) -> ImageProvider {
        self.host.provider()
    }

    pub async fn upload(&self, file: &ImageFile, target: &UploadTarget) -> UploadResult {
        let provider = self.host.provider();
        match self.host.upload(file, target).await {
            Ok(url) => {
                info!(%provider, listing = ?target.listing_id, "Uploaded {}", file.file_name);
                UploadResult {
                    url,
                    provider,
                    success: true,
                    error: None,
                }
            }
            Err(e) => {
                error!(%provider, "Error uploading {}: {:#}", file.file_name, e);
                UploadResult {
                    url: PLACEHOLDER_URL.to_string(),
                    provider: ImageProvider::Local,
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
