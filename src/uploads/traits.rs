use crate::uploads::{ImageFile, ImageProvider, UploadTarget};
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for image hosts.
/// New hosts plug in here without touching the upload call sites.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload `file` and return its public URL
    async fn upload(&self, file: &ImageFile, target: &UploadTarget) -> Result<String>;

    fn provider(&self) -> ImageProvider;
}
