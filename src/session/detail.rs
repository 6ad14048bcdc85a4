//! Single-book lookup keyed by the route identifier.

use tracing::{debug, warn};

use super::CommitOutcome;
use crate::models::Book;
use crate::sources::{CatalogSource, SourceError};

/// Observable state of a detail lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading {
        id: String,
    },
    Found(Book),
    /// Any failure, including malformed responses
    NotFound {
        id: String,
        reason: String,
    },
}

impl DetailState {
    /// Identifier this state refers to, if any
    pub fn id(&self) -> Option<&str> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading { id } | DetailState::NotFound { id, .. } => Some(id.as_str()),
            DetailState::Found(book) => Some(book.id.as_str()),
        }
    }
}

/// A pending detail request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    generation: u64,
    id: String,
}

impl DetailTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn fetch(&self, source: &dyn CatalogSource) -> Result<Book, SourceError> {
        debug!(source = source.id(), id = %self.id, "Fetching book");
        source.get_by_id(&self.id).await
    }
}

/// Fetches each distinct identifier once; a new identifier supersedes
/// whatever was in flight.
#[derive(Debug, Clone, Default)]
pub struct DetailLookup {
    state: DetailState,
    current_id: Option<String>,
    generation: u64,
}

impl DetailLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::Loading { .. })
    }

    /// Start a lookup for `id`, or `None` if that id is already loading or resolved
    pub fn request(&mut self, id: &str) -> Option<DetailTicket> {
        if self.current_id.as_deref() == Some(id) {
            return None;
        }

        self.generation += 1;
        self.current_id = Some(id.to_string());
        self.state = DetailState::Loading { id: id.to_string() };

        Some(DetailTicket {
            generation: self.generation,
            id: id.to_string(),
        })
    }

    pub fn commit(&mut self, ticket: DetailTicket, result: Result<Book, SourceError>) -> CommitOutcome {
        if ticket.generation != self.generation {
            warn!(id = %ticket.id, "Discarding stale detail result");
            return CommitOutcome::Stale;
        }

        match result {
            Ok(book) => {
                self.state = DetailState::Found(book);
                CommitOutcome::Applied
            }
            Err(e) => {
                warn!(id = %ticket.id, "Detail lookup failed: {}", e);
                self.state = DetailState::NotFound {
                    id: ticket.id,
                    reason: e.to_string(),
                };
                CommitOutcome::Failed
            }
        }
    }

    /// Forget the current id; in-flight results become stale
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current_id = None;
        self.state = DetailState::Idle;
    }

    /// Look up `id` and wait for the answer
    pub async fn run(&mut self, source: &dyn CatalogSource, id: &str) -> &DetailState {
        if let Some(ticket) = self.request(id) {
            let result = ticket.fetch(source).await;
            self.commit(ticket, result);
        }
        &self.state
    }
}
