//! Core data models for books and catalog searches.

mod book;
mod search;

pub use book::{Book, BookBuilder};
pub use search::{Category, Page, ParseError, SearchQuery, SortKey, PAGE_SIZE};
