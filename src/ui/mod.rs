//! Terminal rendering for the list and detail views.
//!
//! `render_*` functions build plain text from session state so they can be
//! tested and piped; the `print_*` helpers and [`Spinner`] add color and
//! animation for interactive use.

use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::time::Duration;

use crate::models::{Book, Category};
use crate::session::{DetailState, FetchKind, ListView, ResultSet, SearchForm};
use crate::utils::{get_book_table_columns, strip_html, truncate_with_ellipsis, wrap_text};

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Search,
}

/// A styled status line.
pub fn format_status(status: Status, msg: &str) -> String {
    let icon = status_icon(status);
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), msg),
        Status::Error => format!("{} {}", icon.red().bold(), msg),
        Status::Warning => format!("{} {}", icon.yellow().bold(), msg),
        Status::Search => format!("{} {}", icon.yellow(), msg),
    }
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    println!("{}", format_status(status, msg));
}

/// Welcome banner for interactive browsing.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");

    println!();
    println!("{}", format!("📚 Book Finder v{}", version).bold().cyan());
    println!("{}", "Search the Google Books catalog. Type `help` for commands.".dimmed());
    println!();
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Format a number with commas.
pub fn format_number(n: u64) -> String {
    n.to_string()
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect()
}

/// One line summary of the form fields
pub fn render_form(form: &SearchForm) -> String {
    let text = if form.text().trim().is_empty() {
        "(empty)"
    } else {
        form.text()
    };
    format!(
        "Search: {} | Category: {} | Sort: {}",
        text,
        form.category(),
        form.sort()
    )
}

/// One numbered list line for a book
pub fn render_book_line(index: usize, book: &Book) -> String {
    let mut line = format!("{:>3}. {}", index, book.title);
    let _ = write!(line, " - {}", book.author_line());
    if let Some(year) = book.year() {
        let _ = write!(line, " ({})", year);
    }
    if let Some(category) = book.primary_category() {
        let _ = write!(line, " [{}]", category);
    }
    line
}

fn render_books(out: &mut String, results: &ResultSet) {
    for (i, book) in results.iter().enumerate() {
        let _ = writeln!(out, "{}", render_book_line(i + 1, book));
    }
}

fn render_count(out: &mut String, results: &ResultSet) {
    if let Some(total) = results.total_count() {
        let _ = writeln!(
            out,
            "Showing {} of {} books",
            results.len(),
            format_number(total)
        );
    }
}

fn describe_query(text: &str, category: Category) -> String {
    match category {
        Category::All => format!("\"{}\"", text),
        c => format!("\"{}\" in {}", text, c),
    }
}

/// Render the list view.
///
/// Zero matches and a failed fetch get their own messages; the load-more
/// hint only appears when there are results to page through.
pub fn render_list(view: &ListView<'_>) -> String {
    let mut out = String::new();

    match view {
        ListView::NotStarted => {
            out.push_str("Enter a search to find books.\n");
        }
        ListView::Loading { kind, previous } => {
            render_books(&mut out, previous);
            match kind {
                FetchKind::Submit => out.push_str("Searching...\n"),
                FetchKind::LoadMore => out.push_str("Loading more...\n"),
            }
        }
        ListView::NotFound { query } => {
            let _ = writeln!(
                out,
                "No books found for {}.",
                describe_query(&query.text, query.category)
            );
        }
        ListView::Loaded {
            results,
            can_load_more,
            ..
        } => {
            render_count(&mut out, results);
            render_books(&mut out, results);
            if *can_load_more {
                out.push_str("Type `more` to load more results.\n");
            }
        }
        ListView::Failed {
            kind,
            reason,
            previous,
        } => {
            if previous.has_results() {
                render_count(&mut out, previous);
                render_books(&mut out, previous);
            }
            let _ = writeln!(out, "Search failed: {}", reason);
            // only a failed page fetch is retried by `more`
            if *kind == FetchKind::LoadMore && previous.has_results() {
                out.push_str("Type `more` to retry loading results.\n");
            }
        }
    }

    out
}

/// Render the detail view
pub fn render_detail(state: &DetailState, width: usize) -> String {
    let mut out = String::new();

    match state {
        DetailState::Idle => {}
        DetailState::Loading { id } => {
            let _ = writeln!(out, "Loading book {}...", id);
        }
        DetailState::NotFound { id, reason } => {
            let _ = writeln!(out, "Book \"{}\" was not found.", id);
            let _ = writeln!(out, "Reason: {}", reason);
        }
        DetailState::Found(book) => {
            let _ = writeln!(out, "{}", book.title);
            let _ = writeln!(out, "by {}", book.author_line());
            if !book.categories.is_empty() {
                let _ = writeln!(out, "Categories: {}", book.categories.join(", "));
            }
            if let Some(date) = &book.published_date {
                let _ = writeln!(out, "Published: {}", date);
            }
            if let Some(publisher) = &book.publisher {
                let _ = writeln!(out, "Publisher: {}", publisher);
            }
            if let Some(pages) = book.page_count {
                let _ = writeln!(out, "Pages: {}", pages);
            }
            if let Some(cover) = book.cover() {
                let _ = writeln!(out, "Cover: {}", cover);
            }
            if let Some(link) = &book.info_link {
                let _ = writeln!(out, "Link: {}", link);
            }
            let description = strip_html(&book.description);
            if !description.is_empty() {
                out.push('\n');
                for line in wrap_text(&description, width.saturating_sub(2)) {
                    let _ = writeln!(out, "{}", line);
                }
            }
        }
    }

    out
}

/// Build a table of books sized to `width`
pub fn book_table<'a>(books: impl IntoIterator<Item = &'a Book>, width: usize) -> Table {
    let (_, title_w, authors_w, category_w, _) = get_book_table_columns(width);

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Disabled);
    table.set_header(vec!["#", "Title", "Authors", "Category", "Year"]);

    for (i, book) in books.into_iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate_with_ellipsis(&book.title, title_w)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&book.author_line(), authors_w)),
            Cell::new(truncate_with_ellipsis(
                book.primary_category().unwrap_or(""),
                category_w,
            )),
            Cell::new(book.year().unwrap_or("")),
        ]);
    }

    table
}

fn spinner_style(template: &str, ticks: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
        .tick_chars(ticks)
}

/// Print a loading spinner with message.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(spinner_style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that draws nothing, for piped output.
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Set the message.
    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Remove the spinner line.
    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookBuilder, Page};
    use crate::session::BrowseSession;
    use crate::sources::SourceError;

    fn loaded_session(total: u64, titles: &[&str]) -> BrowseSession {
        let mut session = BrowseSession::new();
        session.form_mut().update_text("dune");
        let ticket = session.submit();
        let books = titles
            .iter()
            .enumerate()
            .map(|(i, t)| BookBuilder::new(format!("id{}", i), *t).authors(["Frank Herbert"]).build())
            .collect();
        session.commit(ticket, Ok(Page::new(total, books)));
        session
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
        assert_eq!(format_number(123), "123");
    }

    #[test]
    fn test_render_form() {
        let mut form = SearchForm::new();
        assert_eq!(
            render_form(&form),
            "Search: (empty) | Category: all | Sort: relevance"
        );
        form.update_text("dune");
        form.update_category(Category::History);
        assert!(render_form(&form).contains("Category: History"));
    }

    #[test]
    fn test_render_book_line() {
        let book = BookBuilder::new("a", "Dune")
            .authors(["Frank Herbert"])
            .categories(["Fiction"])
            .published_date("1965-08-01")
            .build();
        assert_eq!(
            render_book_line(1, &book),
            "  1. Dune - Frank Herbert (1965) [Fiction]"
        );
    }

    #[test]
    fn test_render_list_loaded_with_hint() {
        let session = loaded_session(2, &["Dune", "Dune Messiah"]);
        let text = render_list(&session.view());

        assert!(text.contains("Showing 2 of 2 books"));
        assert!(text.contains("1. Dune"));
        assert!(text.contains("2. Dune Messiah"));
        assert!(text.contains("load more"));
    }

    #[test]
    fn test_render_list_not_found_has_no_hint() {
        let session = loaded_session(0, &[]);
        let text = render_list(&session.view());

        assert!(text.contains("No books found for \"dune\""));
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_render_list_failure_differs_from_not_found() {
        let mut session = BrowseSession::new();
        session.form_mut().update_text("dune");
        let ticket = session.submit();
        session.commit(ticket, Err(SourceError::Network("connection refused".into())));

        let text = render_list(&session.view());
        assert!(text.contains("Search failed: Network error: connection refused"));
        assert!(!text.contains("No books found"));
    }

    #[test]
    fn test_failed_search_after_not_found_shows_no_count() {
        let mut session = loaded_session(0, &[]);
        let ticket = session.submit();
        session.commit(ticket, Err(SourceError::Network("down".into())));

        let text = render_list(&session.view());
        assert!(!text.contains("Showing"));
        assert!(text.contains("Search failed: Network error: down"));
    }

    #[test]
    fn test_failed_search_does_not_offer_retry() {
        let mut session = loaded_session(30, &["Dune"]);
        session.form_mut().update_text("emma");
        let ticket = session.submit();
        session.commit(ticket, Err(SourceError::Network("down".into())));

        let text = render_list(&session.view());
        assert!(text.contains("1. Dune"));
        assert!(text.contains("Search failed: Network error: down"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_failed_load_more_offers_retry() {
        let mut session = loaded_session(30, &["Dune"]);
        let ticket = session.load_more().unwrap();
        session.commit(ticket, Err(SourceError::Network("down".into())));

        let text = render_list(&session.view());
        assert!(text.contains("1. Dune"));
        assert!(text.contains("Type `more` to retry loading results."));
    }

    #[test]
    fn test_format_status_keeps_message() {
        let line = format_status(Status::Warning, "No books found");
        assert!(line.contains(status_icon(Status::Warning)));
        assert!(line.ends_with("No books found"));
    }

    #[test]
    fn test_render_list_not_started() {
        let session = BrowseSession::new();
        assert!(render_list(&session.view()).contains("Enter a search"));
    }

    #[test]
    fn test_describe_query_with_category() {
        assert_eq!(describe_query("dune", Category::All), "\"dune\"");
        assert_eq!(describe_query("dune", Category::Art), "\"dune\" in Art");
    }

    #[test]
    fn test_render_detail_found() {
        let book = BookBuilder::new("abc", "Dune")
            .authors(["Frank Herbert"])
            .publisher("Chilton")
            .description("<p>Spice.</p><p>Sand &amp; worms.</p>")
            .build();
        let text = render_detail(&DetailState::Found(book), 80);

        assert!(text.starts_with("Dune\nby Frank Herbert\n"));
        assert!(text.contains("Publisher: Chilton"));
        assert!(text.contains("Sand & worms."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_render_detail_not_found_mentions_id() {
        let state = DetailState::NotFound {
            id: "xyz".to_string(),
            reason: "Book not found: xyz".to_string(),
        };
        let text = render_detail(&state, 80);
        assert!(text.contains("Book \"xyz\" was not found."));
    }

    #[test]
    fn test_book_table_has_row_per_book() {
        let books = [
            BookBuilder::new("a", "Dune").build(),
            BookBuilder::new("b", "Emma").build(),
        ];
        let table = book_table(books.iter(), 100);
        let rendered = table.to_string();
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("Emma"));
        assert!(rendered.contains("Unknown author"));
    }
}
