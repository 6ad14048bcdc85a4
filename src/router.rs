//! Path routing between the list view and the detail view.
//!
//! Two shapes are recognised: `/` for the list and `/{id}` for the detail
//! page of one book. Identifiers are percent-encoded in paths.

use std::fmt;
use std::str::FromStr;

use crate::models::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    List,
    Detail(String),
}

impl Route {
    /// Match a path, `None` when it is neither `/` nor `/{id}`
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let rest = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        if rest.is_empty() {
            return Some(Route::List);
        }
        if rest.contains('/') {
            return None;
        }

        let id = urlencoding::decode(rest).ok()?.into_owned();
        if id.trim().is_empty() {
            return None;
        }
        Some(Route::Detail(id))
    }

    /// Path that parses back to this route
    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Detail(id) => format!("/{}", urlencoding::encode(id)),
        }
    }

    pub fn detail(id: impl Into<String>) -> Self {
        Route::Detail(id.into())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Route::List)
    }
}

impl FromStr for Route {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s).ok_or_else(|| ParseError::Route(s.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
