//! Integration tests for Book Finder
//!
//! These drive the search session and detail lookup end to end, against a
//! mock HTTP catalog (mockito) and the in-memory `MockSource`.

use book_finder::app::{App, Event};
use book_finder::models::{Category, Page, SortKey};
use book_finder::router::Route;
use book_finder::session::{BrowseSession, CommitOutcome, DetailLookup, DetailState, ListView};
use book_finder::sources::mock::make_book;
use book_finder::sources::{CatalogSource, GoogleBooksSource, MockSource, SourceError};
use book_finder::ui::{render_detail, render_list};
use mockito::Matcher;
use std::sync::Arc;

const PAGE_AB: &str = r#"{
    "kind": "books#volumes",
    "totalItems": 2,
    "items": [
        { "id": "A", "volumeInfo": { "title": "Dune", "authors": ["Frank Herbert"] } },
        { "id": "B", "volumeInfo": { "title": "Dune Messiah", "authors": ["Frank Herbert"] } }
    ]
}"#;

const PAGE_C: &str = r#"{
    "kind": "books#volumes",
    "totalItems": 2,
    "items": [
        { "id": "C", "volumeInfo": { "title": "Children of Dune" } }
    ]
}"#;

fn google_source(server: &mockito::ServerGuard) -> GoogleBooksSource {
    GoogleBooksSource::new()
        .expect("http client")
        .with_base_url(server.url())
}

fn ids(session: &BrowseSession) -> Vec<String> {
    session
        .results()
        .flatten()
        .into_iter()
        .map(|b| b.id.clone())
        .collect()
}

#[tokio::test]
async fn test_submit_then_load_more_over_http() {
    let mut server = mockito::Server::new_async().await;

    let first = server
        .mock("GET", "/volumes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "dune".into()),
            Matcher::UrlEncoded("orderBy".into(), "relevance".into()),
            Matcher::UrlEncoded("startIndex".into(), "0".into()),
            Matcher::UrlEncoded("maxResults".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(PAGE_AB)
        .create_async()
        .await;

    let second = server
        .mock("GET", "/volumes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "dune".into()),
            Matcher::UrlEncoded("startIndex".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(PAGE_C)
        .create_async()
        .await;

    let source = google_source(&server);
    let mut session = BrowseSession::new();
    session.form_mut().update_text("dune");
    session.form_mut().update_category(Category::All);
    session.form_mut().update_sort(SortKey::Relevance);

    assert_eq!(session.run_submit(&source).await, CommitOutcome::Applied);
    assert_eq!(ids(&session), vec!["A", "B"]);
    assert_eq!(session.results().total_count(), Some(2));
    assert!(!session.is_loading());

    assert_eq!(
        session.run_load_more(&source).await,
        Some(CommitOutcome::Applied)
    );
    assert_eq!(ids(&session), vec!["A", "B", "C"]);
    assert_eq!(session.results().total_count(), Some(2));

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_category_is_sent_as_subject_filter() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/volumes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "dune subject:History".into()),
            Matcher::UrlEncoded("orderBy".into(), "newest".into()),
        ]))
        .with_status(200)
        .with_body(PAGE_AB)
        .create_async()
        .await;

    let source = google_source(&server);
    let mut session = BrowseSession::new();
    session.form_mut().update_text("dune");
    session.form_mut().update_category(Category::History);
    session.form_mut().update_sort(SortKey::Newest);

    assert_eq!(session.run_submit(&source).await, CommitOutcome::Applied);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_results_render_not_found_without_load_more() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"kind": "books#volumes", "totalItems": 0, "items": []}"#)
        .create_async()
        .await;

    let source = google_source(&server);
    let mut session = BrowseSession::new();
    session.form_mut().update_text("qwertyuiop");
    session.run_submit(&source).await;

    assert!(!session.results().has_results());
    assert!(matches!(session.view(), ListView::NotFound { .. }));
    assert!(!session.can_load_more());
    assert_eq!(session.run_load_more(&source).await, None);

    let text = render_list(&session.view());
    assert!(text.contains("No books found"));
    assert!(!text.contains("more"));
}

#[tokio::test]
async fn test_server_error_is_distinct_from_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body(r#"{"error": {"code": 503, "message": "Backend Error"}}"#)
        .create_async()
        .await;

    let source = google_source(&server);
    let mut session = BrowseSession::new();
    session.form_mut().update_text("dune");

    assert_eq!(session.run_submit(&source).await, CommitOutcome::Failed);
    assert!(!session.is_loading());
    match session.view() {
        ListView::Failed { reason, .. } => assert!(reason.contains("Backend Error")),
        other => panic!("unexpected view {:?}", other),
    }
    assert!(!render_list(&session.view()).contains("No books found"));
}

#[tokio::test]
async fn test_detail_error_object_is_not_found_with_id() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/volumes/xyz")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body(r#"{"error": {"code": 503, "message": "Service temporarily unavailable."}}"#)
        .create_async()
        .await;

    let source = google_source(&server);
    let mut lookup = DetailLookup::new();
    let state = lookup.run(&source, "xyz").await.clone();

    assert!(!lookup.is_loading());
    assert!(matches!(&state, DetailState::NotFound { id, .. } if id == "xyz"));
    assert!(render_detail(&state, 80).contains("xyz"));
}

#[tokio::test]
async fn test_detail_found_over_http() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/volumes/A")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id": "A", "volumeInfo": {"title": "Dune", "publisher": "Chilton"}}"#)
        .create_async()
        .await;

    let source = google_source(&server);
    let mut lookup = DetailLookup::new();
    match lookup.run(&source, "A").await {
        DetailState::Found(book) => {
            assert_eq!(book.title, "Dune");
            assert_eq!(book.publisher.as_deref(), Some("Chilton"));
        }
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn test_out_of_order_responses_keep_newest_search() {
    let source = MockSource::new();
    let mut session = BrowseSession::new();

    session.form_mut().update_text("old");
    let old = session.submit();
    session.form_mut().update_text("new");
    let new = session.submit();

    source.push_page(Page::new(1, vec![make_book("new-1", "New")]));
    source.push_page(Page::new(1, vec![make_book("old-1", "Old")]));
    let new_result = new.fetch(&source).await;
    let old_result = old.fetch(&source).await;

    assert_eq!(session.commit(new, new_result), CommitOutcome::Applied);
    assert_eq!(session.commit(old, old_result), CommitOutcome::Stale);
    assert_eq!(ids(&session), vec!["new-1"]);
}

#[tokio::test]
async fn test_failed_load_more_keeps_results_and_retries_same_offset() {
    let source = MockSource::new();
    source.push_page(Page::new(30, vec![make_book("a", "A")]));
    source.push_error(SourceError::Network("timeout".into()));
    source.push_page(Page::new(30, vec![make_book("b", "B")]));

    let mut session = BrowseSession::new();
    session.form_mut().update_text("x");
    session.run_submit(&source).await;

    assert_eq!(
        session.run_load_more(&source).await,
        Some(CommitOutcome::Failed)
    );
    assert_eq!(ids(&session), vec!["a"]);
    assert!(render_list(&session.view()).contains("1. A"));

    assert_eq!(
        session.run_load_more(&source).await,
        Some(CommitOutcome::Applied)
    );
    assert_eq!(ids(&session), vec!["a", "b"]);
    assert_eq!(source.requested_offsets(), vec![0, 10, 10]);
}

#[tokio::test]
async fn test_duplicates_across_pages_are_kept() {
    let source = MockSource::new();
    source.push_page(Page::new(3, vec![make_book("a", "A"), make_book("b", "B")]));
    source.push_page(Page::new(3, vec![make_book("b", "B"), make_book("c", "C")]));

    let mut session = BrowseSession::new();
    session.form_mut().update_text("x");
    session.run_submit(&source).await;
    session.run_load_more(&source).await;

    assert_eq!(ids(&session), vec!["a", "b", "b", "c"]);
    assert_eq!(session.results().unique().len(), 3);
}

#[tokio::test]
async fn test_app_flow_from_search_to_detail_and_back() {
    let source = Arc::new(MockSource::new());
    source.push_page(Page::new(2, vec![make_book("a", "Dune"), make_book("b", "Emma")]));
    source.insert_book(make_book("a", "Dune"));

    let mut app = App::new(source.clone() as Arc<dyn CatalogSource>);
    app.handle(Event::TextChanged("classics".into())).await;
    app.handle(Event::Submit).await;

    let path = Route::detail("a").path();
    let route: Route = path.parse().expect("route");
    app.handle(Event::Navigate(route)).await;
    assert!(matches!(app.detail().state(), DetailState::Found(b) if b.id == "a"));

    app.handle(Event::Back).await;
    assert!(app.route().is_list());
    assert_eq!(app.session().results().len(), 2);

    let searches = source.searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query.text, "classics");
}
