use crate::models::{ListingDraft, ListingPatch, ListingShapeError};
use crate::repository::ListingRepository;
use crate::uploads::{ImageFile, ImageRole, ImageUploader, UploadResult, UploadTarget};
use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] ListingShapeError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Outcome of a create; failed uploads show up in `uploads`, not as errors
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedListing {
    pub id: String,
    pub main_image: String,
    pub images: Vec<String>,
    pub uploads: Vec<UploadResult>,
}

impl CreatedListing {
    pub fn all_uploaded(&self) -> bool {
        self.uploads.iter().all(|u| u.success)
    }
}

/// URLs produced by one batch of uploads for a listing
pub(crate) struct UploadedImages {
    pub main: Option<String>,
    pub gallery: Vec<String>,
    pub results: Vec<UploadResult>,
}

/// Upload the cover and gallery files under `id`, in order. Failed uploads
/// contribute the placeholder URL.
pub(crate) async fn upload_images(
    uploader: &ImageUploader,
    id: &str,
    main_image: Option<&ImageFile>,
    gallery: &[ImageFile],
) -> UploadedImages {
    let mut results = Vec::with_capacity(gallery.len() + 1);
    let mut main = None;
    let mut urls = Vec::with_capacity(gallery.len());

    if let Some(file) = main_image {
        let result = uploader
            .upload(file, &UploadTarget::for_listing(id, ImageRole::Main))
            .await;
        main = Some(result.url.clone());
        results.push(result);
    }

    for file in gallery {
        let result = uploader
            .upload(file, &UploadTarget::for_listing(id, ImageRole::Gallery))
            .await;
        urls.push(result.url.clone());
        results.push(result);
    }

    let failed = results.iter().filter(|u| !u.success).count();
    if failed > 0 {
        warn!("{} of {} uploads for {} fell back to the placeholder", failed, results.len(), id);
    }

    UploadedImages {
        main,
        gallery: urls,
        results,
    }
}

/// Create a listing, then upload its images under the ID the store assigned,
/// then patch the record with the resulting URLs. Steps run strictly in order.
pub async fn create_listing(
    repo: &dyn ListingRepository,
    uploader: &ImageUploader,
    draft: ListingDraft,
    main_image: Option<ImageFile>,
    gallery: Vec<ImageFile>,
) -> Result<CreatedListing, CreateError> {
    draft.validate()?;

    let id = repo
        .create(&draft)
        .await
        .context("Failed to create listing")?;
    info!("Created listing {} ({})", id, draft.title);

    if main_image.is_none() && gallery.is_empty() {
        return Ok(CreatedListing {
            id,
            main_image: draft.main_image,
            images: draft.images,
            uploads: Vec::new(),
        });
    }

    let uploaded = upload_images(uploader, &id, main_image.as_ref(), &gallery).await;
    let mut main_url = uploaded.main.unwrap_or(draft.main_image);
    let mut images = draft.images;
    images.extend(uploaded.gallery);
    let uploads = uploaded.results;

    // A gallery-only upload still gives the listing a cover image
    if main_url.is_empty() {
        if let Some(first) = images.first() {
            main_url = first.clone();
        }
    }

    repo.update(&id, &ListingPatch::images(main_url.clone(), images.clone()))
        .await
        .with_context(|| format!("Listing {} created but images were not attached", id))?;

    Ok(CreatedListing {
        id,
        main_image: main_url,
        images,
        uploads,
    })
}
