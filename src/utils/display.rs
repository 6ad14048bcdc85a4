//! Terminal display utilities for robust CLI output formatting.
//!
//! This module provides utilities for formatting CLI output that handles
//! different screen sizes, Unicode text, and the light HTML the catalog puts
//! in book descriptions.

use regex::Regex;
use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Get the global terminal information, initialized on first call.
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| {
        let width = terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH);

        Terminal {
            width,
            is_tty: io::stdout().is_terminal(),
        }
    })
}

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Get the current terminal width in characters.
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Display width of a string in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
///
/// Returns a string that fits within `max_width` columns, appending an
/// ellipsis if truncation occurred.
///
/// # Examples
///
/// ```
/// use book_finder::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    if display_width(text) <= max_width {
        return text.to_string();
    }

    format!("{}...", take_width(text, max_width.saturating_sub(3)))
}

/// Longest prefix of `text` that fits in `budget` columns.
fn take_width(text: &str, budget: usize) -> &str {
    let mut current_width = 0;
    for (idx, c) in text.char_indices() {
        let w = char_width(c);
        if current_width + w > budget {
            return &text[..idx];
        }
        current_width += w;
    }
    text
}

static HTML_TAG: OnceLock<Option<Regex>> = OnceLock::new();
static BLANK_LINES: OnceLock<Option<Regex>> = OnceLock::new();

/// Strip HTML tags and decode the handful of entities the catalog uses.
///
/// Block-level tags (`<p>`, `<br>`, `<li>`, `<div>`) become line breaks so
/// paragraphs survive.
pub fn strip_html(text: &str) -> String {
    let tag = HTML_TAG.get_or_init(|| Regex::new(r"<\s*/?\s*([A-Za-z0-9]*)[^>]*>").ok());
    let blank = BLANK_LINES.get_or_init(|| Regex::new(r"\n\s*\n").ok());

    let stripped = match tag {
        Some(re) => re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let name = caps[1].to_ascii_lowercase();
                if matches!(name.as_str(), "p" | "br" | "li" | "div") {
                    "\n"
                } else {
                    ""
                }
            })
            .into_owned(),
        None => text.to_string(),
    };
    let stripped = match blank {
        Some(re) => re.replace_all(&stripped, "\n").into_owned(),
        None => stripped,
    };

    stripped
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// Greedy word wrap to `width` columns. Existing line breaks are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_whitespace() {
            let w = display_width(word);
            if line_width > 0 && line_width + 1 + w > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += w;
        }

        lines.push(line);
    }

    lines
}

/// Column width configuration for table display.
#[derive(Debug, Clone, Copy)]
pub struct ColumnConfig {
    pub min_width: usize,
    pub max_width: usize,
    pub weight: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            min_width: 1,
            max_width: usize::MAX,
            weight: 1,
        }
    }
}

impl ColumnConfig {
    /// Create a new column config with minimum width.
    pub fn new(min_width: usize) -> Self {
        ColumnConfig {
            min_width,
            max_width: usize::MAX,
            weight: 1,
        }
    }

    /// Set the maximum width.
    pub fn max(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set the weight for space distribution.
    pub fn weight(mut self, weight: usize) -> Self {
        self.weight = weight;
        self
    }
}

/// Calculate column widths from a list of column configurations.
pub fn calculate_dynamic_column_widths(
    terminal_width: usize,
    configs: &[ColumnConfig],
) -> Vec<usize> {
    let n = configs.len();
    if n == 0 {
        return vec![];
    }

    // Account for separators
    let separator_width = n.saturating_sub(1);
    let available_width = terminal_width.saturating_sub(separator_width);

    let min_sum: usize = configs.iter().map(|c| c.min_width).sum();
    if available_width == 0 || min_sum >= available_width {
        return configs.iter().map(|c| c.min_width).collect();
    }

    let preferred_widths: Vec<usize> = configs
        .iter()
        .map(|c| {
            if c.max_width == usize::MAX {
                c.min_width * 2 + 10
            } else {
                (c.min_width + c.max_width) / 2
            }
        })
        .collect();

    let preferred_sum: usize = preferred_widths.iter().sum();
    let total_weight: usize = configs.iter().map(|c| c.weight).sum();

    let mut widths: Vec<usize> = configs.iter().map(|c| c.min_width).collect();
    let mut remaining = available_width - min_sum;

    if preferred_sum > available_width {
        // Need to compress
        let compression_factor = available_width as f64 / preferred_sum as f64;
        for (i, config) in configs.iter().enumerate() {
            let target = (preferred_widths[i] as f64 * compression_factor) as usize;
            widths[i] = target.clamp(config.min_width, config.max_width.max(config.min_width));
        }
    } else {
        // First pass: expand to preferred
        for (i, config) in configs.iter().enumerate() {
            let expansion = (preferred_widths[i] - config.min_width).min(remaining);
            widths[i] = config.min_width + expansion;
            remaining -= expansion;
        }

        // Second pass: distribute remaining by weight
        if remaining > 0 && total_weight > 0 {
            let pool = remaining;
            for (i, config) in configs.iter().enumerate() {
                if remaining == 0 {
                    break;
                }
                let share = (pool * config.weight) / total_weight;
                let can_expand = config.max_width.saturating_sub(widths[i]);
                let to_take = share.min(can_expand).min(remaining);
                widths[i] += to_take;
                remaining -= to_take;
            }
        }
    }

    widths
}

/// Get optimal column widths for a book table.
///
/// Returns (index_width, title_width, authors_width, category_width, year_width).
pub fn get_book_table_columns(terminal_width: usize) -> (usize, usize, usize, usize, usize) {
    let configs = [
        ColumnConfig::new(3).max(4).weight(0),
        ColumnConfig::new(24).max(70).weight(3),
        ColumnConfig::new(14).max(40).weight(1),
        ColumnConfig::new(8).max(20).weight(0),
        ColumnConfig::new(4).max(4).weight(0),
    ];

    let widths = calculate_dynamic_column_widths(terminal_width, &configs);
    (widths[0], widths[1], widths[2], widths[3], widths[4])
}
