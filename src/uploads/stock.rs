use crate::uploads::traits::ImageHost;
use crate::uploads::{ImageFile, ImageProvider, UploadTarget, PLACEHOLDER_URL};
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

const MOCK_IMAGES: [&str; 6] = [
    PLACEHOLDER_URL,
    "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800",
    "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800",
    "https://images.unsplash.com/photo-1605146769289-440113cc3d00?w=800",
    "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=800",
    "https://images.unsplash.com/photo-1512917774080-9991f1c4c750?w=800",
];

pub fn mock_image_url(index: usize) -> &'static str {
    MOCK_IMAGES[index % MOCK_IMAGES.len()]
}

/// Development host: nothing leaves the machine, a stock photo is returned
pub struct LocalHost;

#[async_trait]
impl ImageHost for LocalHost {
    async fn upload(&self, file: &ImageFile, _target: &UploadTarget) -> Result<String> {
        let index = rand::thread_rng().gen_range(0..MOCK_IMAGES.len());
        tracing::debug!("Local host skipping upload of {}", file.file_name);
        Ok(mock_image_url(index).to_string())
    }

    fn provider(&self) -> ImageProvider {
        ImageProvider::Local
    }
}

/// Demo host: seeded Unsplash URLs, stable per listing and role
pub struct UnsplashHost {
    pub width: u32,
    pub height: u32,
}

impl Default for UnsplashHost {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl UnsplashHost {
    pub fn url(&self, seed: &str) -> String {
        format!(
            "https://source.unsplash.com/{}x{}/?house,real-estate,property&seed={}",
            self.width, self.height, seed
        )
    }
}

#[async_trait]
impl ImageHost for UnsplashHost {
    async fn upload(&self, file: &ImageFile, target: &UploadTarget) -> Result<String> {
        let seed = match (&target.listing_id, target.role) {
            (Some(id), Some(role)) => format!("{}-{}", id, role.as_str()),
            (Some(id), None) => id.clone(),
            _ => file.file_name.clone(),
        };
        Ok(self.url(&seed))
    }

    fn provider(&self) -> ImageProvider {
        ImageProvider::Unsplash
    }
}
