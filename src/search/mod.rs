//! Filter, sort and paginate over the in-memory listing set.
//!
//! Stages always run in that order, each consuming the whole output of the
//! previous one.

pub mod criteria;
pub mod paginate;
pub mod sort;

pub use criteria::{Criteria, CRITERIA_KEYS};
pub use paginate::{paginate, Page, PAGE_SIZE};
pub use sort::SortOrder;

use crate::models::Listing;
use std::collections::HashMap;

/// A complete request against the listings view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub criteria: Criteria,
    pub sort: SortOrder,
    pub page: usize,
}

impl ListingQuery {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        Self {
            criteria: Criteria::from_query(params),
            sort: SortOrder::parse(params.get("sort").map(String::as_str)),
            page: params
                .get("page")
                .and_then(|p| p.trim().parse::<usize>().ok())
                .unwrap_or(1),
        }
    }
}

/// Filter, then sort, then cut one page
pub fn run(listings: &[Listing], query: &ListingQuery, page_size: usize) -> Page<Listing> {
    let mut matched = query.criteria.apply(listings);
    query.sort.sort(&mut matched);
    let ordered: Vec<Listing> = matched.into_iter().cloned().collect();
    paginate(&ordered, query.page, page_size)
}

/// Browse-session state: current criteria, order and page.
///
/// Changing criteria or order sends the user back to page 1; everything else
/// keeps the page they are on.
#[derive(Debug, Clone)]
pub struct ListingView {
    criteria: Criteria,
    sort: SortOrder,
    page: usize,
    page_size: usize,
}

impl Default for ListingView {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl ListingView {
    pub fn new(page_size: usize) -> Self {
        Self {
            criteria: Criteria::default(),
            sort: SortOrder::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_criteria(&mut self, criteria: Criteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.page = 1;
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        if sort != self.sort {
            self.sort = sort;
            self.page = 1;
        }
    }

    /// Move to `page`, clamped against the current result size
    pub fn go_to(&mut self, page: usize, listings: &[Listing]) {
        let total = self.criteria.apply(listings).len();
        let pages = paginate::total_pages(total, self.page_size);
        self.page = paginate::clamp_page(page, pages);
    }

    pub fn next(&mut self, listings: &[Listing]) {
        self.go_to(self.page + 1, listings);
    }

    pub fn prev(&mut self, listings: &[Listing]) {
        self.go_to(self.page.saturating_sub(1), listings);
    }

    pub fn render(&self, listings: &[Listing]) -> Page<Listing> {
        let query = ListingQuery {
            criteria: self.criteria.clone(),
            sort: self.sort,
            page: self.page,
        };
        run(listings, &query, self.page_size)
    }
}
