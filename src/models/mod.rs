use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service category of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Property,
    Land,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Property => "property",
            ServiceType::Land => "land",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "property" => Some(ServiceType::Property),
            "land" => Some(ServiceType::Land),
            _ => None,
        }
    }
}

/// Sale status of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    #[serde(rename = "For Sale")]
    ForSale,
    #[serde(rename = "Sold")]
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::ForSale => "For Sale",
            ListingStatus::Sold => "Sold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "For Sale" => Some(ListingStatus::ForSale),
            "Sold" => Some(ListingStatus::Sold),
            _ => None,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core listing record, as served to the site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub location: String,
    pub address: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub service_type: ServiceType,
    pub status: ListingStatus,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub area: f64,
    pub description: String,
    pub features: Vec<String>,
    pub main_image: String,
    pub images: Vec<String>,
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Why a stored document could not be turned into a [`Listing`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingShapeError {
    #[error("field `{0}` is missing")]
    Missing(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Everything needed to create a listing; the ID comes from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub price: f64,
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub service_type: ServiceType,
    #[serde(default = "default_status")]
    pub status: ListingStatus,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: f64,
    pub area: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub main_image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

fn default_status() -> ListingStatus {
    ListingStatus::ForSale
}

impl ListingDraft {
    /// Checks the numeric invariants a persisted listing must hold.
    pub fn validate(&self) -> Result<(), ListingShapeError> {
        if self.title.trim().is_empty() {
            return Err(ListingShapeError::Missing("title"));
        }
        if !(self.price > 0.0) || !self.price.is_finite() {
            return Err(ListingShapeError::Invalid {
                field: "price",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.bathrooms >= 0.0) || !self.bathrooms.is_finite() {
            return Err(ListingShapeError::Invalid {
                field: "bathrooms",
                reason: "must not be negative".to_string(),
            });
        }
        if !(self.area > 0.0) || !self.area.is_finite() {
            return Err(ListingShapeError::Invalid {
                field: "area",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn into_listing(self, id: String, created_at: DateTime<Utc>) -> Listing {
        Listing {
            id,
            title: self.title,
            price: self.price,
            location: self.location,
            address: self.address,
            property_type: self.property_type,
            service_type: self.service_type,
            status: self.status,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            description: self.description,
            features: self.features,
            main_image: self.main_image,
            images: self.images,
            featured: self.featured,
            created_at: Some(created_at),
            updated_at: None,
        }
    }
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl ListingPatch {
    pub fn status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn images(main_image: String, images: Vec<String>) -> Self {
        Self {
            main_image: Some(main_image),
            images: Some(images),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Rejects values that would break listing invariants once applied.
    pub fn validate(&self) -> Result<(), ListingShapeError> {
        if let Some(price) = self.price {
            if !(price > 0.0) || !price.is_finite() {
                return Err(ListingShapeError::Invalid {
                    field: "price",
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if let Some(bathrooms) = self.bathrooms {
            if !(bathrooms >= 0.0) || !bathrooms.is_finite() {
                return Err(ListingShapeError::Invalid {
                    field: "bathrooms",
                    reason: "must not be negative".to_string(),
                });
            }
        }
        if let Some(area) = self.area {
            if !(area > 0.0) || !area.is_finite() {
                return Err(ListingShapeError::Invalid {
                    field: "area",
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(location) = &self.location {
            listing.location = location.clone();
        }
        if let Some(address) = &self.address {
            listing.address = address.clone();
        }
        if let Some(property_type) = &self.property_type {
            listing.property_type = property_type.clone();
        }
        if let Some(service_type) = self.service_type {
            listing.service_type = service_type;
        }
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(bedrooms) = self.bedrooms {
            listing.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            listing.bathrooms = bathrooms;
        }
        if let Some(area) = self.area {
            listing.area = area;
        }
        if let Some(description) = &self.description {
            listing.description = description.clone();
        }
        if let Some(features) = &self.features {
            listing.features = features.clone();
        }
        if let Some(main_image) = &self.main_image {
            listing.main_image = main_image.clone();
        }
        if let Some(images) = &self.images {
            listing.images = images.clone();
        }
        if let Some(featured) = self.featured {
            listing.featured = featured;
        }
    }
}

/// Raw contact form as posted by the site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Accepted, write-once contact submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
}

pub const NEW_CONTACT_STATUS: &str = "new";

impl ContactForm {
    /// Returns the accepted submission, or `None` when a required field is
    /// missing or empty. Whitespace counts as a value.
    pub fn accept(self, now: DateTime<Utc>) -> Option<ContactSubmission> {
        let name = required(self.name)?;
        let email = required(self.email)?;
        let message = required(self.message)?;
        let phone = self.phone.filter(|p| !p.trim().is_empty());

        Some(ContactSubmission {
            name,
            email,
            phone,
            message,
            submitted_at: now,
            status: NEW_CONTACT_STATUS.to_string(),
        })
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn listing(id: &str, price: f64, bedrooms: u32) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Listing {}", id),
            price,
            location: "Austin, TX".to_string(),
            address: format!("{} Main St", id),
            property_type: "House".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::ForSale,
            bedrooms,
            bathrooms: 2.0,
            area: 1_800.0,
            description: String::new(),
            features: vec![],
            main_image: String::new(),
            images: vec![],
            featured: false,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            updated_at: None,
        }
    }
}
