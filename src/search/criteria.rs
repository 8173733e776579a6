use crate::models::{Listing, ListingStatus, ServiceType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Filter criteria for the listings view.
/// Absent fields impose no constraint; present ones are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// Case-insensitive substring of the location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Exact property type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    /// Inclusive lower price bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    /// Minimum bedrooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<f64>,
    /// Minimum bathrooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_area: Option<f64>,
}

/// Query-string keys recognised as criteria
pub const CRITERIA_KEYS: [&str; 10] = [
    "location",
    "type",
    "serviceType",
    "minPrice",
    "maxPrice",
    "status",
    "bedrooms",
    "bathrooms",
    "minArea",
    "maxArea",
];

impl Criteria {
    /// Parse criteria from query-string pairs. Never fails: blank values,
    /// unparseable numbers and unknown enum tags count as absent.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let text = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let num = |key: &str| text(key).and_then(|v| v.parse::<f64>().ok()).filter(|n| n.is_finite());

        Self {
            location: text("location"),
            property_type: text("type"),
            service_type: text("serviceType").and_then(|v| ServiceType::parse(&v)),
            min_price: num("minPrice"),
            max_price: num("maxPrice"),
            status: text("status").and_then(|v| ListingStatus::parse(&v)),
            bedrooms: num("bedrooms"),
            bathrooms: num("bathrooms"),
            min_area: num("minArea"),
            max_area: num("maxArea"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(location) = &self.location {
            if !listing
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(property_type) = &self.property_type {
            if listing.property_type != *property_type {
                return false;
            }
        }
        if let Some(service_type) = self.service_type {
            if listing.service_type != service_type {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price > max {
                return false;
            }
        }
        if let Some(status) = self.status {
            if listing.status != status {
                return false;
            }
        }
        if let Some(bedrooms) = self.bedrooms {
            if f64::from(listing.bedrooms) < bedrooms {
                return false;
            }
        }
        if let Some(bathrooms) = self.bathrooms {
            if listing.bathrooms < bathrooms {
                return false;
            }
        }
        if let Some(min) = self.min_area {
            if listing.area < min {
                return false;
            }
        }
        if let Some(max) = self.max_area {
            if listing.area > max {
                return false;
            }
        }
        true
    }

    /// Single pass over `listings`, keeping collection order
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::listing;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_criteria_keep_everything() {
        let all = vec![listing("a", 1.0, 0), listing("b", 2.0, 5)];
        let criteria = Criteria::from_query(&HashMap::new());
        assert!(criteria.is_empty());
        assert_eq!(criteria.apply(&all).len(), 2);
    }

    #[test]
    fn price_and_bedroom_bounds_are_inclusive() {
        let all = vec![
            listing("low", 299_999.0, 4),
            listing("edge-min", 300_000.0, 3),
            listing("mid", 420_000.0, 2),
            listing("edge-max", 500_000.0, 5),
            listing("high", 500_001.0, 3),
        ];
        let criteria = Criteria::from_query(&params(&[
            ("minPrice", "300000"),
            ("maxPrice", "500000"),
            ("bedrooms", "3"),
        ]));
        let ids: Vec<_> = criteria.apply(&all).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["edge-min", "edge-max"]);
    }

    #[test]
    fn location_is_case_insensitive_substring() {
        let mut a = listing("a", 1.0, 1);
        a.location = "Westlake Hills".to_string();
        let mut b = listing("b", 1.0, 1);
        b.location = "Round Rock".to_string();
        let all = vec![a, b];
        let criteria = Criteria::from_query(&params(&[("location", "LAKE")]));
        let ids: Vec<_> = criteria.apply(&all).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn unparseable_values_are_treated_as_absent() {
        let criteria = Criteria::from_query(&params(&[
            ("minPrice", "cheap"),
            ("bedrooms", ""),
            ("status", "Pending"),
            ("serviceType", "rental"),
            ("maxArea", "NaN"),
        ]));
        assert!(criteria.is_empty());
    }

    #[test]
    fn exact_matches_on_type_service_and_status() {
        let mut land = listing("land", 50_000.0, 0);
        land.property_type = "Lot".to_string();
        land.service_type = ServiceType::Land;
        let mut sold = listing("sold", 50_000.0, 2);
        sold.status = ListingStatus::Sold;
        let all = vec![land, sold, listing("house", 50_000.0, 2)];

        let by_service = Criteria::from_query(&params(&[("serviceType", "land")]));
        assert_eq!(by_service.apply(&all)[0].id, "land");

        let by_status = Criteria::from_query(&params(&[("status", "Sold")]));
        assert_eq!(by_status.apply(&all).len(), 1);

        let by_type = Criteria::from_query(&params(&[("type", "house")]));
        assert!(by_type.apply(&all).is_empty(), "type match is exact");
    }

    #[test]
    fn bathrooms_and_area_bounds() {
        let mut big = listing("big", 1.0, 1);
        big.area = 4_000.0;
        big.bathrooms = 3.5;
        let all = vec![big, listing("std", 1.0, 1)];
        let criteria = Criteria::from_query(&params(&[
            ("bathrooms", "2.5"),
            ("minArea", "2000"),
            ("maxArea", "4000"),
        ]));
        let ids: Vec<_> = criteria.apply(&all).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["big"]);
    }
}
