//! Catalog source plugins.
//!
//! This module defines the [`CatalogSource`] trait that book catalogs implement.
//! The session layer only ever talks to this trait, so the HTTP-backed
//! [`GoogleBooksSource`] and the in-memory [`MockSource`] are interchangeable.
//!
//! A source answers two questions:
//!
//! - **search**: one page of books for a query, starting at a zero-based offset
//! - **get_by_id**: a single book, or [`SourceError::NotFound`]
//!
//! # Example
//!
//! ```rust,no_run
//! use book_finder::models::{Category, SearchQuery, PAGE_SIZE};
//! use book_finder::sources::{CatalogSource, GoogleBooksSource};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = GoogleBooksSource::new()?;
//! let query = SearchQuery::new("dune").category(Category::All);
//! let page = source.search(&query, 0, PAGE_SIZE).await?;
//! println!("{} matches", page.total_items);
//! # Ok(())
//! # }
//! ```

mod google_books;
pub mod mock;

pub use google_books::{GoogleBooksSource, GOOGLE_BOOKS_API_BASE};
pub use mock::MockSource;

use crate::models::{Book, Page, SearchQuery};
use async_trait::async_trait;

/// The CatalogSource trait defines the interface for all book catalogs.
///
/// # Implementing a New Source
///
/// 1. Create a new struct that implements `CatalogSource`
/// 2. Implement `id`, `name` and `search`
/// 3. Implement `get_by_id` if the catalog has a single-item endpoint
#[async_trait]
pub trait CatalogSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "google_books")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch one page of results starting at `offset`, at most `limit` books
    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Page, SourceError>;

    /// Get a single book by its catalog identifier
    async fn get_by_id(&self, _id: &str) -> Result<Book, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Validate that a book ID is correctly formatted for this source
    fn validate_id(&self, id: &str) -> Result<(), SourceError> {
        if id.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty book id".to_string()));
        }
        Ok(())
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested operation is not implemented for this source
    #[error("Operation not implemented for this source")]
    NotImplemented,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Book not found
    #[error("Book not found: {0}")]
    NotFound(String),

    /// API error from the catalog
    #[error("API error: {0}")]
    Api(String),
}

impl SourceError {
    /// Whether this error means the catalog has no such book
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
