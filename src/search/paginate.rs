use serde::Serialize;

/// Listings per page on the browse view
pub const PAGE_SIZE: usize = 6;

/// Page numbers shown around the current page
const WINDOW: usize = 5;

/// One page sliced out of an ordered result set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub page_size: usize,
    pub page_window: Vec<usize>,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamp a requested page into `[1, total_pages]`; an empty set has page 1.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

pub fn paginate<T: Clone>(sorted: &[T], requested: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = sorted.len();
    let total_pages = total_pages(total, page_size);
    let page = clamp_page(requested, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let items = if start < total {
        sorted[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items,
        page,
        total_pages,
        total,
        page_size,
        page_window: page_window(page, total_pages),
    }
}

/// Up to five page numbers centred on `page`, shifted to stay in range
pub fn page_window(page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let mut start = page.saturating_sub(WINDOW / 2).max(1);
    let end = (start + WINDOW - 1).min(total_pages);
    if end + 1 - start < WINDOW {
        start = (end + 1).saturating_sub(WINDOW).max(1);
    }
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_partition_the_list() {
        let items: Vec<u32> = (0..20).collect();
        let pages = total_pages(items.len(), PAGE_SIZE);
        assert_eq!(pages, 4);

        let mut seen = Vec::new();
        for p in 1..=pages {
            let page = paginate(&items, p, PAGE_SIZE);
            assert!(page.items.len() <= PAGE_SIZE);
            seen.extend(page.items);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items: Vec<u32> = (0..13).collect();
        let last = paginate(&items, 99, PAGE_SIZE);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![12]);
        assert!(!last.has_next());

        let first = paginate(&items, 0, PAGE_SIZE);
        assert_eq!(first.page, 1);
        assert!(!first.has_prev());
    }

    #[test]
    fn empty_set_is_a_single_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 4, PAGE_SIZE);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
        assert!(page.page_window.is_empty());
    }

    #[test]
    fn window_shifts_near_the_edges() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
    }
}
