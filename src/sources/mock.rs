//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::models::{Book, BookBuilder, Page, SearchQuery};
use crate::sources::{CatalogSource, SourceError};

/// A search request as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub query: SearchQuery,
    pub offset: usize,
    pub limit: usize,
}

/// A mock catalog that returns scripted responses.
///
/// Search responses are consumed in order; once the script runs out every
/// search returns an empty page. Every search call is recorded so tests can
/// check the offsets that were requested.
#[derive(Debug, Default)]
pub struct MockSource {
    search_responses: Mutex<VecDeque<Result<Page, SourceError>>>,
    books: Mutex<HashMap<String, Book>>,
    searches: Mutex<Vec<RecordedSearch>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page to return from the next unanswered search.
    pub fn push_page(&self, page: Page) {
        lock(&self.search_responses).push_back(Ok(page));
    }

    /// Queue an error to return from the next unanswered search.
    pub fn push_error(&self, error: SourceError) {
        lock(&self.search_responses).push_back(Err(error));
    }

    /// Make a book available to `get_by_id`.
    pub fn insert_book(&self, book: Book) {
        lock(&self.books).insert(book.id.clone(), book);
    }

    /// All searches received so far, oldest first.
    pub fn searches(&self) -> Vec<RecordedSearch> {
        lock(&self.searches).clone()
    }

    /// Offsets of all searches received so far.
    pub fn requested_offsets(&self) -> Vec<usize> {
        lock(&self.searches).iter().map(|s| s.offset).collect()
    }
}

#[async_trait]
impl CatalogSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Catalog"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Page, SourceError> {
        lock(&self.searches).push(RecordedSearch {
            query: query.clone(),
            offset,
            limit,
        });

        lock(&self.search_responses)
            .pop_front()
            .unwrap_or_else(|| Ok(Page::empty()))
    }

    async fn get_by_id(&self, id: &str) -> Result<Book, SourceError> {
        self.validate_id(id)?;
        lock(&self.books)
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

/// Helper function to create a mock book for testing.
pub fn make_book(id: &str, title: &str) -> Book {
    BookBuilder::new(id, title)
        .authors(["Test Author"])
        .small_thumbnail(format!("http://example.com/{}/small.jpg", id))
        .thumbnail(format!("http://example.com/{}/large.jpg", id))
        .build()
}
