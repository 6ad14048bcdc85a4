//! # Book Finder
//!
//! Search a public book catalog, filter by category, sort, page through the
//! results with "load more" and open a detail view per book.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Book, SearchQuery, Page, etc.)
//! - [`sources`]: Catalog clients behind the [`CatalogSource`] trait
//! - [`session`]: Search form, result accumulation and pagination state
//! - [`router`]: List and detail routes
//! - [`app`]: Event handling tying routes and sessions together
//! - [`ui`]: Terminal rendering
//! - [`utils`]: HTTP client, deduplication, and text helpers
//! - [`config`]: Configuration management

pub mod app;
pub mod config;
pub mod models;
pub mod router;
pub mod session;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{Book, Category, Page, SearchQuery, SortKey};
pub use session::{BrowseSession, DetailLookup, ResultSet};
pub use sources::{CatalogSource, GoogleBooksSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
