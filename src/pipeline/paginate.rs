use crate::errors::{ClientError, Result};

/// Page sizes offered by the table footers.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];

/// 1-indexed page position over a result set of unknown length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Pagination {
    /// Any size of at least one is accepted here; the selectable set is only
    /// enforced on user changes through [`Pagination::set_page_size`].
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page < self.total_pages(total)
    }

    /// Moves back one page. Returns false (and stays put) on the first page.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn next(&mut self, total: usize) -> bool {
        if !self.has_next(total) {
            return false;
        }
        self.page += 1;
        true
    }

    /// Jumps to `page`. Out-of-range pages are refused rather than clamped.
    pub fn go_to(&mut self, page: usize, total: usize) -> Result<()> {
        let last = self.total_pages(total);
        if page == 0 || page > last {
            return Err(ClientError::InvalidInput(format!(
                "Page {} is out of range (1-{})",
                page, last
            )));
        }
        self.page = page;
        Ok(())
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if !PAGE_SIZE_OPTIONS.contains(&size) {
            return Err(ClientError::InvalidInput(format!(
                "Page size must be one of {:?}",
                PAGE_SIZE_OPTIONS
            )));
        }
        self.page_size = size;
        self.page = 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1).saturating_mul(self.page_size).min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PAGE_SIZE_OPTIONS[0])
    }
}

/// One rendered page plus the footer state.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

pub fn paginate<'a, T>(items: &'a [T], pagination: &Pagination) -> PageSlice<'a, T> {
    PageSlice {
        items: pagination.slice(items),
        page: pagination.page(),
        total_pages: pagination.total_pages(items.len()),
        total: items.len(),
        has_prev: pagination.has_prev(),
        has_next: pagination.has_next(items.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_still_has_one_page() {
        let p = Pagination::default();
        assert_eq!(p.total_pages(0), 1);
        assert!(p.slice::<u8>(&[]).is_empty());
        assert!(!p.has_prev());
        assert!(!p.has_next(0));
    }

    #[test]
    fn page_size_one_over_two_groups() {
        let items = ["a", "b"];
        let mut p = Pagination::new(1);

        let first = paginate(&items, &p);
        assert_eq!(first.items, ["a"]);
        assert_eq!(first.total_pages, 2);
        assert!(first.has_next);

        assert!(p.next(items.len()));
        assert_eq!(paginate(&items, &p).items, ["b"]);
        assert!(!p.next(items.len()));
        assert_eq!(p.page(), 2);
    }

    #[test]
    fn last_page_is_partial() {
        let items: Vec<u32> = (0..12).collect();
        let mut p = Pagination::new(5);
        p.go_to(3, items.len()).unwrap();
        assert_eq!(p.slice(&items), [10, 11]);
    }

    #[test]
    fn out_of_range_page_is_refused() {
        let mut p = Pagination::new(5);
        assert!(p.go_to(0, 12).is_err());
        assert!(p.go_to(4, 12).is_err());
        assert_eq!(p.page(), 1);
        assert!(!p.prev());
    }

    #[test]
    fn changing_size_resets_to_first_page() {
        let mut p = Pagination::new(5);
        p.go_to(2, 30).unwrap();
        p.set_page_size(20).unwrap();
        assert_eq!((p.page(), p.page_size()), (1, 20));
    }

    #[test]
    fn unsupported_size_is_rejected() {
        let mut p = Pagination::new(5);
        assert!(matches!(p.set_page_size(7), Err(ClientError::InvalidInput(_))));
        assert_eq!(p.page_size(), 5);
    }
}
