//! View-state management for the list and detail views.
//!
//! - [`SearchForm`]: text, category and sort fields
//! - [`ResultSet`]: pages fetched for the current query
//! - [`BrowseSession`]: submit / load-more state machine
//! - [`DetailLookup`]: one-book lookup for the detail route

mod browse;
mod detail;
mod form;
mod results;

pub use browse::{BrowseSession, FetchKind, FetchTicket, ListView, ViewState};
pub use detail::{DetailLookup, DetailState, DetailTicket};
pub use form::SearchForm;
pub use results::ResultSet;

/// What happened when a fetch result was handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The result replaced or extended the current state
    Applied,
    /// The fetch failed; the failure is now the current state
    Failed,
    /// A newer request was issued since; the result was dropped
    Stale,
}
