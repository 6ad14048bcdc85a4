//! Google Books catalog source implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{Book, BookBuilder, Page, SearchQuery};
use crate::sources::{CatalogSource, SourceError};
use crate::utils::HttpClient;

/// Google Books API base URL
pub const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

/// Google Books catalog source
///
/// Uses the public volumes API. An API key is optional; anonymous requests
/// get a lower quota.
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksSource {
    /// Create a new Google Books source with default settings
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: GOOGLE_BOOKS_API_BASE.to_string(),
            api_key: std::env::var("GOOGLE_BOOKS_API_KEY").ok(),
        })
    }

    /// Create from application configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(&config.http)?,
            base_url: config.catalog.base_url.trim_end_matches('/').to_string(),
            api_key: config.catalog.api_key.clone(),
        })
    }

    /// Point the source at a different API root (used for tests and proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build request URL
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Compose the `q` parameter: free text plus an optional `subject:` term.
    ///
    /// `Category::All` contributes nothing.
    pub(crate) fn build_q(query: &SearchQuery) -> String {
        let text = query.text.trim();
        match query.category.subject() {
            Some(subject) if text.is_empty() => format!("subject:{}", subject),
            Some(subject) => format!("{} subject:{}", text, subject),
            None => text.to_string(),
        }
    }

    /// Query parameters for a volumes search
    pub(crate) fn search_params(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", Self::build_q(query)),
            ("orderBy", query.sort.as_str().to_string()),
            ("startIndex", offset.to_string()),
            ("maxResults", limit.to_string()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("key", key.clone()));
        }
        params
    }

    /// Extract the message from an API error body, if the body is one
    fn api_error_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|e| match e.error.code {
                Some(code) => format!("{} ({})", e.error.message, code),
                None => e.error.message,
            })
    }

    /// Convert a volume record into a Book
    fn parse_volume(volume: Volume) -> Book {
        let info = volume.volume_info;
        let mut builder = BookBuilder::new(volume.id, info.title)
            .authors(info.authors)
            .categories(info.categories)
            .description(info.description.unwrap_or_default());

        if let Some(links) = info.image_links {
            if let Some(small) = links.small_thumbnail {
                builder = builder.small_thumbnail(small);
            }
            if let Some(large) = links.thumbnail {
                builder = builder.thumbnail(large);
            }
        }
        if let Some(date) = info.published_date {
            builder = builder.published_date(date);
        }
        if let Some(publisher) = info.publisher {
            builder = builder.publisher(publisher);
        }
        if let Some(pages) = info.page_count {
            builder = builder.page_count(pages);
        }
        if let Some(link) = info.info_link {
            builder = builder.info_link(link);
        }

        builder.build()
    }

    /// Parse a volumes search body into a Page
    pub(crate) fn parse_search_body(body: &str) -> Result<Page, SourceError> {
        let data: VolumesResponse = serde_json::from_str(body)?;
        let items = data.items.into_iter().map(Self::parse_volume).collect();
        Ok(Page::new(data.total_items, items))
    }

    /// Parse a single-volume body; an error object means not found
    pub(crate) fn parse_detail_body(id: &str, body: &str) -> Result<Book, SourceError> {
        match serde_json::from_str::<VolumeOrError>(body)? {
            VolumeOrError::Volume(volume) => Ok(Self::parse_volume(volume)),
            VolumeOrError::Error(envelope) => Err(SourceError::NotFound(format!(
                "{}: {}",
                id, envelope.error.message
            ))),
        }
    }
}

#[async_trait]
impl CatalogSource for GoogleBooksSource {
    fn id(&self) -> &str {
        "google_books"
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Page, SourceError> {
        let q = Self::build_q(query);
        if q.is_empty() {
            return Err(SourceError::InvalidRequest(
                "search text is empty and no category is selected".to_string(),
            ));
        }
        let params = self.search_params(query, offset, limit);

        tracing::debug!(
            q = %q,
            order_by = query.sort.as_str(),
            offset,
            limit,
            "Searching Google Books"
        );

        let response = self
            .client
            .client()
            .get(self.build_url("/volumes"))
            .query(&params)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search Google Books: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = Self::api_error_message(&body)
                .unwrap_or_else(|| format!("Google Books API returned status: {}", status));
            return Err(SourceError::Api(message));
        }

        let page = Self::parse_search_body(&body)?;
        tracing::debug!(
            total_items = page.total_items,
            returned = page.len(),
            "Google Books search complete"
        );
        Ok(page)
    }

    async fn get_by_id(&self, id: &str) -> Result<Book, SourceError> {
        self.validate_id(id)?;

        let url = self.build_url(&format!("/volumes/{}", urlencoding::encode(id)));
        let mut request = self.client.client().get(&url);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key)]);
        }

        tracing::debug!(id, "Fetching Google Books volume");

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch volume: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(id.to_string()));
        }

        // Error objects come back with assorted statuses (404, 503, 400);
        // parse_detail_body maps all of them to NotFound.
        Self::parse_detail_body(id, &body)
    }
}

// ===== Google Books API Types =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    total_items: u64,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: String,
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    image_links: Option<ImageLinks>,
    published_date: Option<String>,
    publisher: Option<String>,
    page_count: Option<u32>,
    info_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    small_thumbnail: Option<String>,
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VolumeOrError {
    Error(ErrorEnvelope),
    Volume(Volume),
}
