use crate::admin::create::upload_images;
use crate::admin::CreatedListing;
use crate::models::{Listing, ListingPatch};
use crate::repository::ListingRepository;
use crate::uploads::{ImageFile, ImageUploader};
use anyhow::{Context, Result};
use tracing::info;

/// Replace an existing listing's images with freshly uploaded files.
///
/// A new cover replaces the old one; new gallery files replace the whole
/// gallery. Whatever is not re-uploaded is kept. Uploads are keyed by the
/// listing's own ID and failures keep the placeholder URL.
pub async fn replace_images(
    repo: &dyn ListingRepository,
    uploader: &ImageUploader,
    listing: &Listing,
    main_image: Option<ImageFile>,
    gallery: Vec<ImageFile>,
) -> Result<CreatedListing> {
    let uploaded = upload_images(uploader, &listing.id, main_image.as_ref(), &gallery).await;

    let mut main_url = uploaded.main.unwrap_or_else(|| listing.main_image.clone());
    let images = if gallery.is_empty() {
        listing.images.clone()
    } else {
        uploaded.gallery
    };
    if main_url.is_empty() {
        if let Some(first) = images.first() {
            main_url = first.clone();
        }
    }

    repo.update(&listing.id, &ListingPatch::images(main_url.clone(), images.clone()))
        .await
        .with_context(|| format!("Failed to attach new images to {}", listing.id))?;
    info!("Replaced images on listing {}", listing.id);

    Ok(CreatedListing {
        id: listing.id.clone(),
        main_image: main_url,
        images,
        uploads: uploaded.results,
    })
}
