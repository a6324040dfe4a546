//! Page-number pagination for post listings.

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// A 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    /// Page `number` of a post listing; the first page when none is given.
    pub fn posts(number: Option<u64>) -> Self {
        Self {
            number: number.unwrap_or(1),
            size: POSTS_PER_PAGE,
        }
    }

    /// Number of items to skip before this page.
    pub fn offset(&self) -> u64 {
        self.number.saturating_sub(1) * self.size
    }
}

/// One page of results plus what is needed to render the pager.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            number: request.number,
            size: request.size,
            total,
        }
    }

    /// Slice a fully materialized, already ordered result set.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .collect();
        Self::new(items, request, total)
    }

    /// An empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        if self.total == 0 || self.size == 0 {
            1
        } else {
            self.total.div_ceil(self.size)
        }
    }

    /// Page numbers outside `1..=num_pages` do not exist.
    pub fn exists(&self) -> bool {
        self.number >= 1 && self.number <= self.num_pages()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pages_hold_ten_items() {
        let all: Vec<u32> = (0..25).collect();

        let first = Page::from_all(all.clone(), PageRequest::posts(None));
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());
        assert_eq!(first.num_pages(), 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = Page::from_all(all, PageRequest::posts(Some(3)));
        assert_eq!(last.items, (20..25).collect::<Vec<_>>());
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_empty_listing_has_first_page() {
        let page = Page::<u32>::from_all(Vec::new(), PageRequest::posts(Some(1)));
        assert_eq!(page.num_pages(), 1);
        assert!(page.exists());
    }

    #[test]
    fn test_out_of_range_pages_do_not_exist() {
        let all: Vec<u32> = (0..10).collect();
        assert!(!Page::from_all(all.clone(), PageRequest::posts(Some(2))).exists());
        assert!(!Page::from_all(all, PageRequest::posts(Some(0))).exists());
    }
}
