//! Client-side search and pagination over an already fetched listing
use crate::providers::s3::ListingEntry;

/// Number of pages needed to show `count` entries, never less than one
pub fn total_pages(count: usize, page_size: usize) -> usize {
    ((count + page_size - 1) / page_size).max(1)
}

/// Slice of `entries` shown on `page` (1-indexed), plus the page count
///
/// `page` isn't clamped: a page past the end yields an empty slice.
pub fn window<T>(entries: &[T], page: usize, page_size: usize) -> (&[T], usize) {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(entries.len());
    let end = page.saturating_mul(page_size).min(entries.len());
    (&entries[start..end], total_pages(entries.len(), page_size))
}

/// Entries whose display name contains `query`, ignoring case
pub fn filter<'a>(entries: &'a [ListingEntry], query: &str) -> Vec<&'a ListingEntry> {
    let query = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.name().to_lowercase().contains(&query))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
    page_size: usize,
    total_pages: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> PaginationState {
        assert!(page_size > 0, "Page size has to be at least 1");
        PaginationState {
            current_page: 1,
            page_size,
            total_pages: 1,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Recomputes the page count for `count` entries, keeping the current
    /// page within range
    pub fn update(&mut self, count: usize) {
        self.total_pages = total_pages(count, self.page_size);
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }

    /// Returns false when already on the last page
    pub fn next_page(&mut self) -> bool {
        let next = (self.current_page + 1).min(self.total_pages);
        let moved = next != self.current_page;
        self.current_page = next;
        moved
    }

    /// Returns false when already on the first page
    pub fn previous_page(&mut self) -> bool {
        let previous = self.current_page.saturating_sub(1).max(1);
        let moved = previous != self.current_page;
        self.current_page = previous;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<ListingEntry> {
        names
            .iter()
            .map(|name| {
                if name.ends_with('/') {
                    ListingEntry::folder(name)
                } else {
                    ListingEntry::object(name, None, Some(1))
                }
            })
            .collect()
    }

    #[test]
    fn windows_of_25_entries() {
        let items: Vec<usize> = (0..25).collect();

        let (visible, total) = window(&items, 1, 10);
        assert_eq!(visible, &items[0..10]);
        assert_eq!(total, 3);

        let (visible, total) = window(&items, 2, 10);
        assert_eq!(visible, &items[10..20]);
        assert_eq!(total, 3);

        let (visible, total) = window(&items, 3, 10);
        assert_eq!(visible, &items[20..25]);
        assert_eq!(total, 3);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let items: Vec<usize> = Vec::new();
        let (visible, total) = window(&items, 1, 10);
        assert!(visible.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let items: Vec<usize> = (0..5).collect();
        let (visible, total) = window(&items, 4, 2);
        assert!(visible.is_empty());
        assert_eq!(total, 3);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn empty_query_keeps_everything() {
        let all = entries(&["docs/", "docs/a.txt", "b.txt"]);
        let found = filter(&all, "");
        assert_eq!(found.len(), 3);
        assert!(found.iter().zip(all.iter()).all(|(f, e)| *f == e));
    }

    #[test]
    fn filter_is_case_insensitive() {
        let all = entries(&["docs/Report.PDF", "docs/notes.txt"]);
        let found = filter(&all, "report");
        assert_eq!(found, vec![&all[0]]);
    }

    #[test]
    fn filter_matches_display_name_only() {
        let all = entries(&["reports/", "reports/summary.txt", "reports/q1/"]);
        // "reports" is part of every key but only the folder's name
        let found = filter(&all, "reports");
        assert_eq!(found, vec![&all[0]]);
        // Trailing '/' of folders isn't part of the name
        assert!(filter(&all, "q1/").is_empty());
    }

    #[test]
    fn pagination_state_stays_in_range() {
        let mut state = PaginationState::new(10);
        state.update(25);
        assert_eq!(state.total_pages(), 3);
        assert!(!state.previous_page());
        assert!(state.next_page());
        assert!(state.next_page());
        assert!(!state.next_page());
        assert_eq!(state.current_page(), 3);

        state.update(5);
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.current_page(), 1);

        state.update(0);
        assert_eq!(state.total_pages(), 1);
        state.reset();
        assert_eq!(state.current_page(), 1);
    }
}
