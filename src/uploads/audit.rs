//! Advisory check that a listing's image URLs point at uploads made for it.
//! The listing's own `mainImage`/`images` fields stay authoritative.

use crate::models::Listing;
use crate::uploads::cloudinary::ROOT_FOLDER;
use crate::uploads::{ImageRole, PLACEHOLDER_URL};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Association {
    /// URL names this listing's ID
    Matched,
    /// URL names a different listing's ID
    Foreign,
    /// Uploaded before the listing had an ID
    Temporary,
    Placeholder,
    /// Host gives no way to tell
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCheck {
    pub url: String,
    pub role: ImageRole,
    pub association: Association,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAudit {
    pub listing_id: String,
    pub images: Vec<ImageCheck>,
}

impl ImageAudit {
    pub fn all_matched(&self) -> bool {
        self.images
            .iter()
            .all(|c| c.association == Association::Matched)
    }
}

/// Listing ID encoded in a hosted image URL, if the host records one
pub fn owner_from_url(url: &str) -> Option<String> {
    let marker = format!("/{}/", ROOT_FOLDER);
    let rest = &url[url.find(&marker)? + marker.len()..];
    let folder = rest.split('/').next()?;
    if folder.is_empty() {
        return None;
    }
    Some(folder.to_string())
}

fn classify(url: &str, listing_id: &str) -> (Association, Option<String>) {
    if url.is_empty() || url == PLACEHOLDER_URL {
        return (Association::Placeholder, None);
    }
    match owner_from_url(url) {
        Some(owner) if owner == listing_id => (Association::Matched, Some(owner)),
        Some(owner) if owner == "temp" || owner.starts_with("temp_") => {
            (Association::Temporary, Some(owner))
        }
        Some(owner) => (Association::Foreign, Some(owner)),
        None => (Association::Unknown, None),
    }
}

pub fn audit_listing(listing: &Listing) -> ImageAudit {
    let main = (!listing.main_image.is_empty())
        .then(|| (listing.main_image.as_str(), ImageRole::Main));
    let gallery = listing
        .images
        .iter()
        .map(|url| (url.as_str(), ImageRole::Gallery));

    let images = main
        .into_iter()
        .chain(gallery)
        .map(|(url, role)| {
            let (association, owner) = classify(url, &listing.id);
            ImageCheck {
                url: url.to_string(),
                role,
                association,
                owner,
            }
        })
        .collect();

    ImageAudit {
        listing_id: listing.id.clone(),
        images,
    }
}
