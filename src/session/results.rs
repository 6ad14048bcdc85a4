//! Accumulated result pages for the current query.

use serde::Serialize;

use crate::models::{Book, Page};
use crate::utils::dedup_by_id;

/// Ordered sequence of fetched pages, in fetch order.
///
/// A new search replaces the whole set with one page; "load more" appends
/// one page per successful fetch. Nothing else mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pages: Vec<Page>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all pages with `page`
    pub fn reset(&mut self, page: Page) {
        self.pages.clear();
        self.pages.push(page);
    }

    /// Add `page` after the existing pages
    pub fn append(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// All books, page order then within-page order. Repeats are kept.
    pub fn flatten(&self) -> Vec<&Book> {
        self.iter().collect()
    }

    /// Iterate books in the same order as [`flatten`](Self::flatten)
    pub fn iter(&self) -> impl Iterator<Item = &Book> + '_ {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    /// Books with repeated ids removed, first occurrence wins
    pub fn unique(&self) -> Vec<&Book> {
        dedup_by_id(self.iter())
    }

    /// Server-reported total from the first page; later totals are ignored
    pub fn total_count(&self) -> Option<u64> {
        self.pages.first().map(|p| p.total_items)
    }

    /// Whether there is something to show and page through
    pub fn has_results(&self) -> bool {
        matches!(self.total_count(), Some(n) if n != 0)
    }

    /// A search ran and the catalog reported zero matches
    pub fn is_not_found(&self) -> bool {
        self.total_count() == Some(0)
    }

    /// Whether no page has been stored yet
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of books across all pages
    pub fn len(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Number of stored pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Book at a flattened index
    pub fn get(&self, index: usize) -> Option<&Book> {
        self.iter().nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookBuilder;

    fn book(id: &str) -> Book {
        BookBuilder::new(id, id.to_uppercase()).build()
    }

    fn page(total: u64, ids: &[&str]) -> Page {
        Page::new(total, ids.iter().map(|id| book(id)).collect())
    }

    fn ids(set: &ResultSet) -> Vec<String> {
        set.flatten().into_iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn test_empty_set() {
        let set = ResultSet::new();
        assert!(set.is_empty());
        assert_eq!(set.total_count(), None);
        assert!(!set.has_results());
        assert!(!set.is_not_found());
        assert!(set.flatten().is_empty());
    }

    #[test]
    fn test_reset_discards_prior_pages() {
        let mut set = ResultSet::new();
        set.reset(page(50, &["a", "b"]));
        set.append(page(50, &["c"]));

        set.reset(page(7, &["x", "y", "z"]));
        assert_eq!(ids(&set), vec!["x", "y", "z"]);
        assert_eq!(set.total_count(), Some(7));
        assert_eq!(set.page_count(), 1);
    }

    #[test]
    fn test_append_keeps_first_total() {
        let mut set = ResultSet::new();
        set.reset(page(2, &["a", "b"]));
        set.append(page(99, &["c"]));

        assert_eq!(ids(&set), vec!["a", "b", "c"]);
        assert_eq!(set.total_count(), Some(2));
    }

    #[test]
    fn test_flatten_length_matches_page_sums() {
        // Mixed reset/append sequences; length always equals the sum of live pages
        let script: &[(bool, &[&str])] = &[
            (true, &["a"]),
            (false, &["b", "c"]),
            (false, &[]),
            (true, &["d", "e"]),
            (false, &["f"]),
            (false, &["d"]),
        ];

        let mut set = ResultSet::new();
        let mut expected: Vec<String> = Vec::new();
        for (is_reset, page_ids) in script {
            let p = page(10, page_ids);
            if *is_reset {
                expected.clear();
                set.reset(p);
            } else {
                set.append(p);
            }
            expected.extend(page_ids.iter().map(|s| s.to_string()));

            assert_eq!(set.flatten().len(), set.len());
            assert_eq!(ids(&set), expected);
            assert_eq!(set.len(), expected.len());
        }
    }

    #[test]
    fn test_duplicates_are_kept_but_unique_drops_them() {
        let mut set = ResultSet::new();
        set.reset(page(3, &["a", "b"]));
        set.append(page(3, &["b", "c"]));

        assert_eq!(ids(&set), vec!["a", "b", "b", "c"]);
        let unique: Vec<&str> = set.unique().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(unique, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_has_results_and_not_found() {
        let mut set = ResultSet::new();
        set.reset(Page::empty());
        assert!(!set.has_results());
        assert!(set.is_not_found());

        set.reset(page(1, &["a"]));
        assert!(set.has_results());
        assert!(!set.is_not_found());
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut set = ResultSet::new();
        set.reset(page(4, &["a", "b"]));
        set.append(page(4, &["c"]));

        let first = ids(&set);
        let total = set.total_count();
        for _ in 0..3 {
            assert_eq!(ids(&set), first);
            assert_eq!(set.total_count(), total);
        }
    }

    #[test]
    fn test_get_by_flat_index() {
        let mut set = ResultSet::new();
        set.reset(page(3, &["a", "b"]));
        set.append(page(3, &["c"]));

        assert_eq!(set.get(2).map(|b| b.id.as_str()), Some("c"));
        assert!(set.get(3).is_none());
    }
}
