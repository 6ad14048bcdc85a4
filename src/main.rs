use anyhow::{Context, Result};
use book_finder::app::{App, Event};
use book_finder::config::{default_config_path, find_config_file, get_config, load_config, Config};
use book_finder::models::{Book, Category, SearchQuery, SortKey};
use book_finder::router::Route;
use book_finder::session::{BrowseSession, CommitOutcome, DetailLookup, DetailState, ViewState};
use book_finder::sources::{CatalogSource, GoogleBooksSource};
use book_finder::ui::{
    book_table, format_number, format_status, print_banner, print_section, print_status,
    render_book_line, render_detail, render_form, render_list, Spinner, Status,
};
use book_finder::utils::{is_terminal, terminal_width};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Book Finder - Search the Google Books catalog from the terminal
#[derive(Parser, Debug)]
#[command(name = "book-finder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search the Google Books catalog: filter, sort, load more and open book details", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for books
    Search {
        /// Free-text query
        query: String,

        /// Category filter (all, art, biography, computers, history, medical, poetry)
        #[arg(long, short, default_value = "all")]
        category: Category,

        /// Sort order (relevance, newest)
        #[arg(long, short, default_value = "relevance")]
        sort: SortKey,

        /// Number of pages to fetch ("load more" count plus one)
        #[arg(long, short, default_value_t = 1)]
        pages: usize,

        /// Drop books repeated across pages
        #[arg(long)]
        dedup: bool,
    },

    /// Show details for one book
    Show {
        /// Catalog identifier
        id: String,
    },

    /// Open a route path: `/` or `/{id}`
    Open {
        /// Route path
        path: String,
    },

    /// Interactive search session
    Browse,

    /// List the available categories
    Categories,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Destination (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Print this file as written, without environment overrides
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Book Finder - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  GOOGLE_BOOKS_API_KEY        API key for Google Books (higher quota)");
    println!();
    println!("Catalog Settings:");
    println!("  BOOK_FINDER_CATALOG__BASE_URL    API root (default: https://www.googleapis.com/books/v1)");
    println!("  BOOK_FINDER_CATALOG__API_KEY     API key, same as GOOGLE_BOOKS_API_KEY");
    println!("  BOOK_FINDER_CATALOG__PAGE_SIZE   Books per page, 1-40 (default: 10)");
    println!();
    println!("HTTP Settings:");
    println!("  BOOK_FINDER_HTTP__TIMEOUT_SECONDS          Request timeout (default: 30)");
    println!("  BOOK_FINDER_HTTP__CONNECT_TIMEOUT_SECONDS  Connect timeout (default: 10)");
    println!("  BOOK_FINDER_HTTP__USER_AGENT               User agent override");
    println!("  HTTP_PROXY / HTTPS_PROXY / NO_PROXY        Standard proxy settings");
    println!();
    println!("Logging:");
    println!("  BOOK_FINDER_LOGGING__LEVEL   Default log level (default: warn)");
    println!("  BOOK_FINDER_LOGGING__FORMAT  `json` for structured logs");
    println!("  RUST_LOG                     Rust logging filter (overrides the above)");
    println!();
    println!("Example:");
    println!("  export GOOGLE_BOOKS_API_KEY=\"your-key-here\"");
    println!("  export BOOK_FINDER_CATALOG__PAGE_SIZE=\"20\"");
    std::process::exit(0);
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("book_finder={}", level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_deref() == Some("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        load_config(&config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        get_config()?
    };

    if let Some(timeout) = cli.timeout {
        config.http.timeout_seconds = timeout;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
    }

    let config = resolve_config(&cli)?;
    init_logging(&cli, &config);

    if let Some(path) = cli.config.clone().or_else(find_config_file) {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = cli.output.resolve();

    match cli.command {
        Some(Commands::Search {
            query,
            category,
            sort,
            pages,
            dedup,
        }) => {
            let source = GoogleBooksSource::from_config(&config)?;
            let mut session = BrowseSession::with_page_size(config.catalog.page_size);
            session.form_mut().update_text(query);
            session.form_mut().update_category(category);
            session.form_mut().update_sort(sort);

            let spinner = spinner_for(format, cli.quiet, "Searching...");
            fetch_pages(&mut session, &source, pages, &spinner).await;
            spinner.finish_and_clear();

            print!("{}", render_results(&session, format, dedup)?);
            if let ViewState::Failed { reason, .. } = session.state() {
                anyhow::bail!("Search failed: {}", reason);
            }
        }

        Some(Commands::Show { id }) => {
            let source = GoogleBooksSource::from_config(&config)?;
            show_book(&source, &id, format, cli.quiet).await?;
        }

        Some(Commands::Open { path }) => {
            let route: Route = path.parse()?;
            match route {
                Route::List => {
                    println!("{} is the list view; use `book-finder search` or `book-finder browse`.", route);
                }
                Route::Detail(id) => {
                    let source = GoogleBooksSource::from_config(&config)?;
                    show_book(&source, &id, format, cli.quiet).await?;
                }
            }
        }

        Some(Commands::Browse) => {
            let source: Arc<dyn CatalogSource> = Arc::new(GoogleBooksSource::from_config(&config)?);
            let session = BrowseSession::with_page_size(config.catalog.page_size);
            browse(App::with_session(source, session)).await?;
        }

        Some(Commands::Categories) => {
            if format == OutputFormat::Json {
                let labels: Vec<&str> = Category::ALL.iter().map(Category::label).collect();
                println!("{}", serde_json::to_string_pretty(&labels)?);
            } else {
                for category in Category::ALL {
                    println!("{}", category);
                }
            }
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { path, force } => {
                let path = path
                    .or_else(default_config_path)
                    .context("could not determine a config directory; pass --path")?;
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                Config::default().save(&path)?;
                print_status(Status::Success, &format!("Wrote {}", path.display()));
            }
            ConfigAction::Show { file: Some(path) } => {
                let file_config = Config::load_file(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                print!("{}", file_config.to_redacted_toml()?);
            }
            ConfigAction::Show { file: None } => {
                print!("{}", config.to_redacted_toml()?);
            }
        },

        None => {
            println!("No command specified. Use --help for usage information.");
        }
    }

    Ok(())
}

fn spinner_for(format: OutputFormat, quiet: bool, msg: &str) -> Spinner {
    if quiet || format == OutputFormat::Json || !is_terminal() {
        Spinner::hidden()
    } else {
        Spinner::new(msg)
    }
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: Option<&'a SearchQuery>,
    total_items: Option<u64>,
    count: usize,
    books: Vec<&'a Book>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Run the search, then up to `pages - 1` load-mores.
///
/// Stops at the first fetch that does not apply, leaving its failure as the
/// session state.
async fn fetch_pages(
    session: &mut BrowseSession,
    source: &dyn CatalogSource,
    pages: usize,
    spinner: &Spinner,
) -> CommitOutcome {
    let outcome = session.run_submit(source).await;
    if outcome != CommitOutcome::Applied {
        return outcome;
    }

    for _ in 1..pages.max(1) {
        spinner.set_message(&format!(
            "Loading page from offset {}...",
            session.cursor() + session.page_size()
        ));
        match session.run_load_more(source).await {
            Some(CommitOutcome::Applied) => {}
            Some(outcome) => return outcome,
            None => break,
        }
    }

    CommitOutcome::Applied
}

fn render_results(session: &BrowseSession, format: OutputFormat, dedup: bool) -> Result<String> {
    let results = session.results();
    let books = if dedup {
        results.unique()
    } else {
        results.flatten()
    };
    let error = match session.state() {
        ViewState::Failed { reason, .. } => Some(reason.as_str()),
        _ => None,
    };

    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            let output = SearchOutput {
                query: session.results_query(),
                total_items: results.total_count(),
                count: books.len(),
                books,
                error,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Plain => {
            if results.is_not_found() {
                out.push_str(&render_list(&session.view()));
            }
            for (i, book) in books.iter().enumerate() {
                writeln!(out, "{}", render_book_line(i + 1, book))?;
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if results.is_not_found() {
                let msg = render_list(&session.view());
                writeln!(out, "{}", format_status(Status::Warning, msg.trim_end()))?;
            } else if !books.is_empty() {
                let total = results.total_count().unwrap_or(0);
                let msg = format!("Showing {} of {} books", books.len(), format_number(total));
                writeln!(out, "{}", format_status(Status::Search, &msg))?;
                writeln!(out, "{}", book_table(books, terminal_width()))?;
            }
        }
    }

    Ok(out)
}

async fn show_book(
    source: &dyn CatalogSource,
    id: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let spinner = spinner_for(format, quiet, &format!("Loading {}...", id));
    let mut lookup = DetailLookup::new();
    let state = lookup.run(source, id).await;
    spinner.finish_and_clear();

    match state {
        DetailState::Found(book) if format == OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(book)?);
        }
        DetailState::NotFound { id, reason } => {
            anyhow::bail!("Book \"{}\" was not found: {}", id, reason);
        }
        other => {
            print!("{}", render_detail(other, terminal_width()));
        }
    }

    Ok(())
}

/// A parsed line from the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Events(Vec<Event>),
    Help,
    Quit,
}

fn parse_browse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let events = match word.to_ascii_lowercase().as_str() {
        "" => Vec::new(),
        "help" | "?" => return Ok(BrowseCommand::Help),
        "quit" | "exit" | "q" => return Ok(BrowseCommand::Quit),
        "text" => vec![Event::TextChanged(rest.to_string())],
        "category" | "cat" => {
            let category = rest.parse::<Category>().map_err(|e| e.to_string())?;
            vec![Event::CategoryChanged(category)]
        }
        "sort" => {
            let sort = rest.parse::<SortKey>().map_err(|e| e.to_string())?;
            vec![Event::SortChanged(sort)]
        }
        "search" | "s" if rest.is_empty() => vec![Event::Submit],
        "search" | "s" => vec![Event::TextChanged(rest.to_string()), Event::Submit],
        "more" | "m" => vec![Event::LoadMore],
        "back" | "b" => vec![Event::Back],
        "open" | "o" => {
            if rest.is_empty() {
                return Err("usage: open <number|id|/path>".to_string());
            }
            match rest.parse::<usize>() {
                Ok(0) => return Err("list numbers start at 1".to_string()),
                Ok(n) => vec![Event::Select(n - 1)],
                Err(_) if rest.starts_with('/') => {
                    let route = rest.parse::<Route>().map_err(|e| e.to_string())?;
                    vec![Event::Navigate(route)]
                }
                Err(_) => vec![Event::Navigate(Route::detail(rest))],
            }
        }
        other => return Err(format!("unknown command '{}' (type `help`)", other)),
    };

    Ok(BrowseCommand::Events(events))
}

fn print_browse_help() {
    print_section("Commands");
    println!("  text <words>       set the search text");
    println!("  category <name>    all, art, biography, computers, history, medical, poetry");
    println!("  sort <key>         relevance or newest");
    println!("  search [words]     run the search (optionally setting the text first)");
    println!("  more               load the next page");
    println!("  open <n|id|/path>  open a book by list number, id or route");
    println!("  back               return to the list");
    println!("  help               show this help");
    println!("  quit               leave");
}

fn render_current(app: &App) {
    match app.route() {
        Route::List => print!("{}", render_list(&app.session().view())),
        Route::Detail(_) => print!("{}", render_detail(app.detail().state(), terminal_width())),
    }
}

async fn browse(mut app: App) -> Result<()> {
    print_banner();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}\n> ", render_form(app.session().form()));
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_browse_command(&line) {
            Ok(BrowseCommand::Quit) => break,
            Ok(BrowseCommand::Help) => print_browse_help(),
            Ok(BrowseCommand::Events(events)) => {
                let fetches = events.iter().any(|e| {
                    matches!(
                        e,
                        Event::Submit | Event::LoadMore | Event::Select(_) | Event::Navigate(_)
                    )
                });
                let spinner = if fetches && is_terminal() {
                    Spinner::new("Loading...")
                } else {
                    Spinner::hidden()
                };
                for event in events {
                    app.handle(event).await;
                }
                spinner.finish_and_clear();

                if fetches || matches!(app.route(), Route::Detail(_)) {
                    render_current(&app);
                }
            }
            Err(msg) => print_status(Status::Error, &msg),
        }
    }

    println!();
    Ok(())
}
