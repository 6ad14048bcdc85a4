//! Search form state: the fields a user edits before submitting.

use crate::models::{Category, SearchQuery, SortKey};

/// Current text, category and sort selections.
///
/// Setters only store values; nothing is fetched until the owning
/// [`BrowseSession`](super::BrowseSession) submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    text: String,
    category: Category,
    sort: SortKey,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn update_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn update_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Snapshot the fields into a query
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.text.trim())
            .category(self.category)
            .sort(self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let form = SearchForm::new();
        assert_eq!(form.text(), "");
        assert_eq!(form.category(), Category::All);
        assert_eq!(form.sort(), SortKey::Relevance);
    }

    #[test]
    fn test_query_snapshot_is_independent() {
        let mut form = SearchForm::new();
        form.update_text("  dune ");
        form.update_category(Category::History);
        form.update_sort(SortKey::Newest);

        let query = form.query();
        form.update_text("foundation");

        assert_eq!(query.text, "dune");
        assert_eq!(query.category, Category::History);
        assert_eq!(query.sort, SortKey::Newest);
        assert_eq!(form.query().text, "foundation");
    }
}
