//! Search and "load more" pagination over a catalog source.
//!
//! [`BrowseSession`] is a plain state machine. Starting a fetch hands out a
//! [`FetchTicket`]; the caller runs it against a [`CatalogSource`] and feeds
//! the result back through [`BrowseSession::commit`]. Each ticket carries
//! the generation it was issued under, and only a ticket from the current
//! generation may change state, so a slow response can never overwrite a
//! newer one.

use tracing::{debug, warn};

use super::{CommitOutcome, ResultSet, SearchForm};
use crate::models::{Page, SearchQuery, PAGE_SIZE};
use crate::sources::{CatalogSource, SourceError};

/// Which transition issued a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// New search, page 0
    Submit,
    /// Next page of the current search
    LoadMore,
}

/// A pending catalog request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
    query: SearchQuery,
    offset: usize,
    limit: usize,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run the request against `source`
    pub async fn fetch(&self, source: &dyn CatalogSource) -> Result<Page, SourceError> {
        debug!(
            source = source.id(),
            kind = ?self.kind,
            offset = self.offset,
            limit = self.limit,
            "Fetching page"
        );
        source.search(&self.query, self.offset, self.limit).await
    }
}

/// Lifecycle of the list view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Nothing submitted yet
    #[default]
    NotStarted,
    /// A fetch is outstanding
    Loading(FetchKind),
    /// The last fetch committed successfully
    Loaded,
    /// The last fetch failed; earlier results are kept
    Failed { kind: FetchKind, reason: String },
}

/// What the list view should show, derived from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView<'a> {
    NotStarted,
    Loading {
        kind: FetchKind,
        previous: &'a ResultSet,
    },
    /// The catalog reported zero matches
    NotFound { query: &'a SearchQuery },
    Loaded {
        query: &'a SearchQuery,
        results: &'a ResultSet,
        can_load_more: bool,
    },
    Failed {
        kind: FetchKind,
        reason: &'a str,
        previous: &'a ResultSet,
    },
}

/// Form, accumulated results and pagination cursor for one list view
#[derive(Debug, Clone)]
pub struct BrowseSession {
    form: SearchForm,
    results_query: Option<SearchQuery>,
    results: ResultSet,
    cursor: usize,
    committed_offset: usize,
    page_size: usize,
    generation: u64,
    state: ViewState,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowseSession {
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    /// Session requesting `page_size` books per fetch (at least one)
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            form: SearchForm::new(),
            results_query: None,
            results: ResultSet::new(),
            cursor: 0,
            committed_offset: 0,
            page_size: page_size.max(1),
            generation: 0,
            state: ViewState::NotStarted,
        }
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Query that produced the current results
    pub fn results_query(&self) -> Option<&SearchQuery> {
        self.results_query.as_ref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Offset of the page most recently requested
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading(_))
    }

    /// Whether [`load_more`](Self::load_more) would issue a fetch
    pub fn can_load_more(&self) -> bool {
        self.results.has_results() && !self.is_loading()
    }

    /// Whether the reported total exceeds what has been fetched.
    ///
    /// Informational; totals from the catalog are estimates and do not gate
    /// [`load_more`](Self::load_more).
    pub fn has_more(&self) -> bool {
        match self.results.total_count() {
            Some(total) => (self.results.len() as u64) < total,
            None => false,
        }
    }

    /// Start a new search from the current form fields.
    ///
    /// Always issues a fetch of page 0. Any fetch still in flight is
    /// superseded and its result will be discarded on commit.
    pub fn submit(&mut self) -> FetchTicket {
        let query = self.form.query();
        self.generation += 1;
        self.cursor = 0;
        self.state = ViewState::Loading(FetchKind::Submit);

        debug!(generation = self.generation, query = %query.text, category = %query.category, sort = %query.sort, "Submitting search");

        FetchTicket {
            generation: self.generation,
            kind: FetchKind::Submit,
            query,
            offset: 0,
            limit: self.page_size,
        }
    }

    /// Request the next page of the current results.
    ///
    /// Returns `None` while a fetch is outstanding or when there are no
    /// results to page through.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if !self.can_load_more() {
            debug!(loading = self.is_loading(), "Ignoring load more");
            return None;
        }
        let query = self.results_query.clone()?;

        self.cursor += self.page_size;
        self.generation += 1;
        self.state = ViewState::Loading(FetchKind::LoadMore);

        debug!(generation = self.generation, offset = self.cursor, "Loading more");

        Some(FetchTicket {
            generation: self.generation,
            kind: FetchKind::LoadMore,
            query,
            offset: self.cursor,
            limit: self.page_size,
        })
    }

    /// Apply the result of a fetch issued by this session
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, SourceError>,
    ) -> CommitOutcome {
        if ticket.generation != self.generation {
            warn!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale fetch result"
            );
            return CommitOutcome::Stale;
        }

        match result {
            Ok(page) => {
                debug!(
                    kind = ?ticket.kind,
                    total = page.total_items,
                    items = page.len(),
                    "Committing page"
                );
                match ticket.kind {
                    FetchKind::Submit => {
                        self.results.reset(page);
                        self.results_query = Some(ticket.query);
                    }
                    FetchKind::LoadMore => self.results.append(page),
                }
                self.cursor = ticket.offset;
                self.committed_offset = ticket.offset;
                self.state = ViewState::Loaded;
                CommitOutcome::Applied
            }
            Err(e) => {
                warn!(kind = ?ticket.kind, offset = ticket.offset, "Fetch failed: {}", e);
                self.cursor = self.committed_offset;
                self.state = ViewState::Failed {
                    kind: ticket.kind,
                    reason: e.to_string(),
                };
                CommitOutcome::Failed
            }
        }
    }

    /// Submit and wait for the first page
    pub async fn run_submit(&mut self, source: &dyn CatalogSource) -> CommitOutcome {
        let ticket = self.submit();
        let result = ticket.fetch(source).await;
        self.commit(ticket, result)
    }

    /// Load the next page and wait for it; `None` if nothing was requested
    pub async fn run_load_more(&mut self, source: &dyn CatalogSource) -> Option<CommitOutcome> {
        let ticket = self.load_more()?;
        let result = ticket.fetch(source).await;
        Some(self.commit(ticket, result))
    }

    /// Derive the list view for rendering
    pub fn view(&self) -> ListView<'_> {
        match &self.state {
            ViewState::NotStarted => ListView::NotStarted,
            ViewState::Loading(kind) => ListView::Loading {
                kind: *kind,
                previous: &self.results,
            },
            ViewState::Failed { kind, reason } => ListView::Failed {
                kind: *kind,
                reason,
                previous: &self.results,
            },
            ViewState::Loaded => match &self.results_query {
                Some(query) if self.results.is_not_found() => ListView::NotFound { query },
                Some(query) => ListView::Loaded {
                    query,
                    results: &self.results,
                    can_load_more: self.can_load_more(),
                },
                None => ListView::NotStarted,
            },
        }
    }
}
