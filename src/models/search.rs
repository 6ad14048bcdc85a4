//! Search query and page models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Book;

/// Number of books requested per page
pub const PAGE_SIZE: usize = 10;

/// Errors from parsing user-supplied filter values and paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown category '{0}' (expected one of: all, art, biography, computers, history, medical, poetry)")]
    Category(String),

    #[error("unknown sort key '{0}' (expected relevance or newest)")]
    SortKey(String),

    #[error("not a valid route: '{0}'")]
    Route(String),
}

/// Subject category filter
///
/// `All` means no filter at all; it is never sent to the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Art,
    Biography,
    Computers,
    History,
    Medical,
    Poetry,
}

impl Category {
    /// Every category, in the order the search form lists them
    pub const ALL: [Category; 7] = [
        Category::All,
        Category::Art,
        Category::Biography,
        Category::Computers,
        Category::History,
        Category::Medical,
        Category::Poetry,
    ];

    /// Display label, as shown in the category picker
    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Art => "Art",
            Category::Biography => "Biography",
            Category::Computers => "Computers",
            Category::History => "History",
            Category::Medical => "Medical",
            Category::Poetry => "Poetry",
        }
    }

    /// Subject value to send to the catalog, `None` for `All`
    pub fn subject(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            other => Some(other.label()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::Category(s.to_string()))
    }
}

/// Ordering applied by the catalog service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    Newest,
}

impl SortKey {
    /// Value sent as the catalog's `orderBy` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Newest => "newest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "newest" => Ok(SortKey::Newest),
            _ => Err(ParseError::SortKey(s.to_string())),
        }
    }
}

/// A submitted search
///
/// Built from the search form on submit and never edited afterwards; the
/// next submit replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    pub text: String,

    /// Category filter
    pub category: Category,

    /// Sort key
    pub sort: SortKey,
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set category filter
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set sort key
    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// One catalog response to a single paginated search request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Total number of matches reported by the catalog
    pub total_items: u64,

    /// Books on this page (possibly empty)
    #[serde(default)]
    pub items: Vec<Book>,
}

impl Page {
    /// Create a new page
    pub fn new(total_items: u64, items: Vec<Book>) -> Self {
        Self { total_items, items }
    }

    /// A page reporting zero matches
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of books on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no books
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
