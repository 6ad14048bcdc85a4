//! Book model representing a single volume from the catalog.

use serde::{Deserialize, Serialize};

/// A book (catalog volume)
///
/// Identity is `id`; everything else is display data. Values are immutable
/// once a catalog client has produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog identifier, stable and unique per catalog
    pub id: String,

    /// Book title
    pub title: String,

    /// Authors in the order the catalog lists them
    pub authors: Vec<String>,

    /// Subject categories in the order the catalog lists them
    pub categories: Vec<String>,

    /// Description text (may contain simple HTML from the catalog)
    pub description: String,

    /// Small cover image, used in result lists
    pub small_thumbnail: Option<String>,

    /// Large cover image, used on the detail view
    pub thumbnail: Option<String>,

    /// Publication date as reported by the catalog (free-form, often `YYYY` or `YYYY-MM-DD`)
    pub published_date: Option<String>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Page count
    pub page_count: Option<u32>,

    /// Catalog info page URL
    pub info_link: Option<String>,
}

impl Book {
    /// Create a new book with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            categories: Vec::new(),
            description: String::new(),
            small_thumbnail: None,
            thumbnail: None,
            published_date: None,
            publisher: None,
            page_count: None,
            info_link: None,
        }
    }

    /// Authors joined for display, or "Unknown author"
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown author".to_string()
        } else {
            self.authors.join(", ")
        }
    }

    /// First category, which is what list views show
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(|s| s.as_str())
    }

    /// Four-digit year from the publication date, if it has one
    pub fn year(&self) -> Option<&str> {
        self.published_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }

    /// Best available cover image, large first
    pub fn cover(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or(self.small_thumbnail.as_deref())
    }
}

/// Builder for constructing Book objects
#[derive(Debug, Clone)]
pub struct BookBuilder {
    book: Book,
}

impl BookBuilder {
    /// Create a new builder with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            book: Book::new(id, title),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set categories
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.book.description = description.into();
        self
    }

    /// Set the small cover image
    pub fn small_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.book.small_thumbnail = Some(url.into());
        self
    }

    /// Set the large cover image
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.book.thumbnail = Some(url.into());
        self
    }

    /// Set publication date
    pub fn published_date(mut self, date: impl Into<String>) -> Self {
        self.book.published_date = Some(date.into());
        self
    }

    /// Set publisher
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.book.publisher = Some(publisher.into());
        self
    }

    /// Set page count
    pub fn page_count(mut self, pages: u32) -> Self {
        self.book.page_count = Some(pages);
        self
    }

    /// Set info link
    pub fn info_link(mut self, url: impl Into<String>) -> Self {
        self.book.info_link = Some(url.into());
        self
    }

    /// Build the Book
    pub fn build(self) -> Book {
        self.book
    }
}
