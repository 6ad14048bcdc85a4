//! Event handling for the interactive front end.
//!
//! The front end turns user input into [`Event`]s and hands them to
//! [`App::handle`], which updates the route, the list session and the
//! detail lookup. Catalog fetches triggered by an event are awaited inside
//! `handle`; the returned [`CommitOutcome`] says what became of them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use book_finder::app::{App, Event};
//! use book_finder::sources::GoogleBooksSource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = App::new(Arc::new(GoogleBooksSource::new()?));
//! app.handle(Event::TextChanged("dune".into())).await;
//! app.handle(Event::Submit).await;
//! app.handle(Event::LoadMore).await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::models::{Category, SortKey};
use crate::router::Route;
use crate::session::{BrowseSession, CommitOutcome, DetailLookup};
use crate::sources::CatalogSource;

/// User events forwarded from the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TextChanged(String),
    CategoryChanged(Category),
    SortChanged(SortKey),
    Submit,
    LoadMore,
    /// Open the detail view for the book at this zero-based list position
    Select(usize),
    /// Go to a route directly
    Navigate(Route),
    /// Return to the list view
    Back,
}

/// Route plus the state behind each view
#[derive(Debug)]
pub struct App {
    source: Arc<dyn CatalogSource>,
    route: Route,
    session: BrowseSession,
    detail: DetailLookup,
}

impl App {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::with_session(source, BrowseSession::new())
    }

    pub fn with_session(source: Arc<dyn CatalogSource>, session: BrowseSession) -> Self {
        Self {
            source,
            route: Route::List,
            session,
            detail: DetailLookup::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn session(&self) -> &BrowseSession {
        &self.session
    }

    pub fn detail(&self) -> &DetailLookup {
        &self.detail
    }

    pub fn source(&self) -> &dyn CatalogSource {
        self.source.as_ref()
    }

    /// Apply one event. Returns the outcome of the fetch it triggered, if any.
    pub async fn handle(&mut self, event: Event) -> Option<CommitOutcome> {
        debug!(?event, route = %self.route, "Handling event");

        match event {
            Event::TextChanged(text) => {
                self.session.form_mut().update_text(text);
                None
            }
            Event::CategoryChanged(category) => {
                self.session.form_mut().update_category(category);
                None
            }
            Event::SortChanged(sort) => {
                self.session.form_mut().update_sort(sort);
                None
            }
            Event::Submit => {
                self.route = Route::List;
                Some(self.session.run_submit(self.source.as_ref()).await)
            }
            Event::LoadMore => self.session.run_load_more(self.source.as_ref()).await,
            Event::Select(index) => {
                let id = self.session.results().get(index)?.id.clone();
                self.navigate(Route::Detail(id)).await
            }
            Event::Navigate(route) => self.navigate(route).await,
            Event::Back => self.navigate(Route::List).await,
        }
    }

    async fn navigate(&mut self, route: Route) -> Option<CommitOutcome> {
        self.route = route;
        match &self.route {
            Route::List => {
                self.detail.clear();
                None
            }
            Route::Detail(id) => {
                let ticket = self.detail.request(id)?;
                let result = ticket.fetch(self.source.as_ref()).await;
                Some(self.detail.commit(ticket, result))
            }
        }
    }
}
