//! Shape coercion between loosely typed store documents and [`Listing`].
//!
//! Documents written by older admin forms carry numbers as strings, miss
//! optional fields, or use bare booleans as strings. Everything is coerced
//! here so the rest of the crate only sees validated listings.

use crate::models::{Listing, ListingShapeError, ListingStatus, ServiceType};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

/// Build a [`Listing`] from a document body and its store ID.
pub fn listing_from_document(id: &str, doc: &Document) -> Result<Listing, ListingShapeError> {
    let title = text(doc, "title").ok_or(ListingShapeError::Missing("title"))?;

    let price = number(doc, "price").ok_or(ListingShapeError::Missing("price"))?;
    if price < 0.0 {
        return Err(ListingShapeError::Invalid {
            field: "price",
            reason: format!("negative value {}", price),
        });
    }

    let service_type = match text(doc, "serviceType") {
        Some(raw) => ServiceType::parse(&raw).ok_or(ListingShapeError::Invalid {
            field: "serviceType",
            reason: format!("unknown category {:?}", raw),
        })?,
        None => ServiceType::Property,
    };

    let status = match text(doc, "status") {
        Some(raw) => ListingStatus::parse(&raw).ok_or(ListingShapeError::Invalid {
            field: "status",
            reason: format!("unknown status {:?}", raw),
        })?,
        None => ListingStatus::ForSale,
    };

    let bedrooms = number(doc, "bedrooms").unwrap_or(0.0);
    let bathrooms = number(doc, "bathrooms").unwrap_or(0.0);
    if bedrooms < 0.0 || bathrooms < 0.0 {
        return Err(ListingShapeError::Invalid {
            field: "bedrooms",
            reason: "room counts must not be negative".to_string(),
        });
    }

    let area = number(doc, "area").ok_or(ListingShapeError::Missing("area"))?;
    if area <= 0.0 {
        return Err(ListingShapeError::Invalid {
            field: "area",
            reason: format!("non-positive value {}", area),
        });
    }

    Ok(Listing {
        id: id.to_string(),
        title,
        price,
        location: text(doc, "location").unwrap_or_default(),
        address: text(doc, "address").unwrap_or_default(),
        property_type: text(doc, "type").unwrap_or_default(),
        service_type,
        status,
        bedrooms: bedrooms.round() as u32,
        bathrooms,
        area,
        description: text(doc, "description").unwrap_or_default(),
        features: strings(doc, "features"),
        main_image: text(doc, "mainImage").unwrap_or_default(),
        images: strings(doc, "images"),
        featured: flag(doc, "featured"),
        created_at: timestamp(doc, "createdAt"),
        updated_at: timestamp(doc, "updatedAt"),
    })
}

fn text(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(doc: &Document, key: &str) -> Option<f64> {
    match doc.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn flag(doc: &Document, key: &str) -> bool {
    match doc.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn strings(doc: &Document, key: &str) -> Vec<String> {
    match doc.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn timestamp(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    match doc.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Encode a plain JSON value in the Firestore REST value format.
pub fn to_firestore_value(key: &str, value: &Value) -> Value {
    match value {
        Value::Null => serde_json::json!({ "nullValue": null }),
        Value::Bool(b) => serde_json::json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => serde_json::json!({ "integerValue": i.to_string() }),
            None => serde_json::json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) if key.ends_with("At") && DateTime::parse_from_rfc3339(s).is_ok() => {
            serde_json::json!({ "timestampValue": s })
        }
        Value::String(s) => serde_json::json!({ "stringValue": s }),
        Value::Array(items) => serde_json::json!({
            "arrayValue": {
                "values": items.iter().map(|v| to_firestore_value("", v)).collect::<Vec<_>>()
            }
        }),
        Value::Object(map) => serde_json::json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}

pub fn to_firestore_fields(map: &Document) -> Document {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(k, v)))
        .collect()
}

/// Decode a Firestore REST value into plain JSON.
pub fn from_firestore_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "booleanValue" => inner.clone(),
        "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vs| vs.iter().map(from_firestore_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(from_firestore_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

pub fn from_firestore_fields(fields: &Document) -> Document {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn coerces_stringly_typed_numbers_and_flags() {
        let d = doc(json!({
            "title": "Hillside Cottage",
            "price": "425,000",
            "bedrooms": "3",
            "bathrooms": 2.5,
            "area": 1650,
            "featured": "true",
            "status": "Sold",
            "serviceType": "property",
            "features": ["Garage", "", 7],
            "createdAt": "2024-03-01T10:00:00Z"
        }));
        let listing = listing_from_document("abc", &d).unwrap();
        assert_eq!(listing.price, 425_000.0);
        assert_eq!(listing.bedrooms, 3);
        assert_eq!(listing.bathrooms, 2.5);
        assert!(listing.featured);
        assert_eq!(listing.status, ListingStatus::Sold);
        assert_eq!(listing.features, vec!["Garage".to_string()]);
        assert!(listing.created_at.is_some());
    }

    #[test]
    fn rejects_documents_without_title_or_price() {
        let d = doc(json!({ "price": 10 }));
        assert_eq!(
            listing_from_document("x", &d),
            Err(ListingShapeError::Missing("title"))
        );
        let d = doc(json!({ "title": "No price" }));
        assert_eq!(
            listing_from_document("x", &d),
            Err(ListingShapeError::Missing("price"))
        );
    }

    #[test]
    fn rejects_missing_or_non_positive_area() {
        let d = doc(json!({ "title": "Lot", "price": 90000 }));
        assert_eq!(
            listing_from_document("x", &d),
            Err(ListingShapeError::Missing("area"))
        );
        let d = doc(json!({ "title": "Lot", "price": 90000, "area": "0" }));
        assert!(matches!(
            listing_from_document("x", &d),
            Err(ListingShapeError::Invalid { field: "area", .. })
        ));
    }

    #[test]
    fn rejects_unknown_status() {
        let d = doc(json!({ "title": "T", "price": 1, "status": "Pending" }));
        assert!(matches!(
            listing_from_document("x", &d),
            Err(ListingShapeError::Invalid { field: "status", .. })
        ));
    }

    #[test]
    fn firestore_encoding_tags_timestamps_and_integers() {
        let map = doc(json!({
            "price": 300000,
            "bathrooms": 1.5,
            "createdAt": "2024-03-01T10:00:00+00:00",
            "images": ["a.jpg"]
        }));
        let fields = to_firestore_fields(&map);
        assert_eq!(fields["price"], json!({ "integerValue": "300000" }));
        assert_eq!(fields["bathrooms"], json!({ "doubleValue": 1.5 }));
        assert!(fields["createdAt"].get("timestampValue").is_some());

        let decoded = from_firestore_fields(&fields);
        assert_eq!(decoded["price"], json!(300000));
        assert_eq!(decoded["images"], json!(["a.jpg"]));
    }
}
