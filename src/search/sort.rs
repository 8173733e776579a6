use crate::models::Listing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Total orders offered by the listings view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "title")]
    Title,
}

impl SortOrder {
    /// Unknown or missing keys fall back to `newest`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("price-asc") => SortOrder::PriceAsc,
            Some("price-desc") => SortOrder::PriceDesc,
            Some("oldest") => SortOrder::Oldest,
            Some("title") => SortOrder::Title,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Title => "title",
        }
    }

    fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortOrder::PriceAsc => a.price.total_cmp(&b.price),
            SortOrder::PriceDesc => b.price.total_cmp(&a.price),
            SortOrder::Newest => created(b).cmp(&created(a)),
            SortOrder::Oldest => created(a).cmp(&created(b)),
            SortOrder::Title => compare_titles(&a.title, &b.title),
        }
    }

    /// Stable sort: ties keep their incoming relative order
    pub fn sort(&self, listings: &mut [&Listing]) {
        listings.sort_by(|a, b| self.compare(a, b));
    }
}

// Undated records sort as the oldest
fn created(listing: &Listing) -> DateTime<Utc> {
    listing.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Case-folded comparison first so "apple" sits next to "Apple",
/// then the raw strings to keep the order total.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::listing;
    use chrono::TimeZone;

    fn ids(listings: &[&Listing]) -> Vec<String> {
        listings.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn price_orders_reverse_each_other_without_ties() {
        let all = vec![
            listing("a", 300.0, 1),
            listing("b", 100.0, 1),
            listing("c", 200.0, 1),
        ];
        let mut asc: Vec<&Listing> = all.iter().collect();
        SortOrder::PriceAsc.sort(&mut asc);
        let mut desc: Vec<&Listing> = all.iter().collect();
        SortOrder::PriceDesc.sort(&mut desc);

        let mut reversed = ids(&desc);
        reversed.reverse();
        assert_eq!(ids(&asc), vec!["b", "c", "a"]);
        assert_eq!(ids(&asc), reversed);
    }

    #[test]
    fn price_ties_keep_original_order() {
        let all = vec![
            listing("first", 200.0, 1),
            listing("cheap", 100.0, 1),
            listing("second", 200.0, 1),
        ];
        let mut desc: Vec<&Listing> = all.iter().collect();
        SortOrder::PriceDesc.sort(&mut desc);
        assert_eq!(ids(&desc), vec!["first", "second", "cheap"]);

        let mut asc: Vec<&Listing> = all.iter().collect();
        SortOrder::PriceAsc.sort(&mut asc);
        assert_eq!(ids(&asc), vec!["cheap", "first", "second"]);
    }

    #[test]
    fn newest_is_default_and_orders_by_created_at() {
        let mut old = listing("old", 1.0, 1);
        old.created_at = Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap());
        let mut new = listing("new", 1.0, 1);
        new.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let mut undated = listing("undated", 1.0, 1);
        undated.created_at = None;
        let all = vec![old, undated, new];

        let order = SortOrder::parse(None);
        assert_eq!(order, SortOrder::Newest);
        let mut sorted: Vec<&Listing> = all.iter().collect();
        order.sort(&mut sorted);
        assert_eq!(ids(&sorted), vec!["new", "old", "undated"]);

        SortOrder::Oldest.sort(&mut sorted);
        assert_eq!(ids(&sorted), vec!["undated", "old", "new"]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let mut a = listing("a", 1.0, 1);
        a.title = "bungalow".to_string();
        let mut b = listing("b", 1.0, 1);
        b.title = "Apartment".to_string();
        let mut c = listing("c", 1.0, 1);
        c.title = "Cottage".to_string();
        let all = vec![a, b, c];
        let mut sorted: Vec<&Listing> = all.iter().collect();
        SortOrder::Title.sort(&mut sorted);
        assert_eq!(ids(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn unknown_sort_key_falls_back_to_newest() {
        assert_eq!(SortOrder::parse(Some("cheapest")), SortOrder::Newest);
        assert_eq!(SortOrder::parse(Some("price-desc")), SortOrder::PriceDesc);
    }
}
