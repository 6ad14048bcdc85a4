//! Utility modules supporting catalog browsing.
//!
//! - [`HttpClient`]: shared HTTP client built from the `[http]` config section
//! - [`dedup_by_id`]: drop books repeated across pages
//! - [`truncate_with_ellipsis`], [`wrap_text`], [`strip_html`]: terminal text helpers
//!
//! # Deduplication
//!
//! ```rust
//! use book_finder::models::BookBuilder;
//! use book_finder::utils::dedup_by_id;
//!
//! let books = vec![
//!     BookBuilder::new("a", "Dune").build(),
//!     BookBuilder::new("a", "Dune").build(),
//! ];
//! assert_eq!(dedup_by_id(&books).len(), 1);
//! ```

mod dedup;
mod display;
mod http;

pub use dedup::dedup_by_id;
pub use display::{
    calculate_dynamic_column_widths, display_width, get_book_table_columns, is_terminal,
    strip_html, terminal_info, terminal_width, truncate_with_ellipsis, wrap_text, ColumnConfig,
    Terminal, DEFAULT_WIDTH,
};
pub use http::{HttpClient, DEFAULT_USER_AGENT};
