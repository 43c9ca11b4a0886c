use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{BookQuery, CatalogProvider, ProviderCandidate, ProviderError, non_empty};
use crate::services::match_selector::{ExactTitleAuthor, MatchStrategy};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

#[derive(Debug, Deserialize)]
struct GoogleBooksResponse {
    items: Option<Vec<GoogleBookItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleBookItem {
    #[serde(rename = "volumeInfo", default)]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleVolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    description: Option<String>,
    #[serde(rename = "imageLinks")]
    image_links: Option<GoogleImageLinks>,
    #[serde(rename = "industryIdentifiers")]
    industry_identifiers: Option<Vec<GoogleIdentifier>>,
}

#[derive(Debug, Deserialize)]
struct GoogleImageLinks {
    thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail")]
    small_thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

/// Primary catalog: Google Books volumes search
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
    strategy: Arc<dyn MatchStrategy>,
}

impl GoogleBooksClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            strategy: Arc::new(ExactTitleAuthor),
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn MatchStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    async fn fetch_candidates(
        &self,
        search: &str,
        query: &BookQuery,
    ) -> Result<Vec<ProviderCandidate>, ProviderError> {
        let url = format!(
            "{}/volumes?q={}",
            self.base_url,
            urlencoding::encode(search)
        );

        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        let parsed: GoogleBooksResponse = serde_json::from_str(&body)?;

        Ok(parsed
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| to_candidate(item.volume_info, query))
            .collect())
    }
}

#[async_trait]
impl CatalogProvider for GoogleBooksClient {
    async fn search(&self, query: &BookQuery) -> Result<Option<ProviderCandidate>, ProviderError> {
        let mut candidates = Vec::new();

        if let Some(isbn) = &query.isbn {
            candidates = self
                .fetch_candidates(&format!("isbn:{}", isbn), query)
                .await?;
            if candidates.is_empty() {
                tracing::debug!(
                    "Google Books has no volume for isbn:{}, trying free text",
                    isbn
                );
            }
        }

        if candidates.is_empty() {
            candidates = self.fetch_candidates(&query.search_text(), query).await?;
        }

        Ok(self.strategy.select(&candidates, query).cloned())
    }

    fn name(&self) -> &'static str {
        "Google Books"
    }
}

fn to_candidate(info: GoogleVolumeInfo, query: &BookQuery) -> ProviderCandidate {
    let image_url = info
        .image_links
        .and_then(|links| non_empty(links.thumbnail).or(non_empty(links.small_thumbnail)))
        // Google Books returns http links often, upgrade to https
        .map(|thumb| match thumb.strip_prefix("http://") {
            Some(rest) => format!("https://{}", rest),
            None => thumb,
        });

    ProviderCandidate {
        title: info.title.unwrap_or_else(|| query.title.clone()),
        authors: info
            .authors
            .unwrap_or_else(|| vec![query.author.clone()]),
        image_url,
        synopsis: non_empty(info.description),
        isbn: pick_isbn(info.industry_identifiers.as_deref().unwrap_or_default()),
    }
}

/// Prefer ISBN-13; an ISBN-10 is used as-is when it is the only one
fn pick_isbn(identifiers: &[GoogleIdentifier]) -> Option<String> {
    let find = |kind: &str| {
        identifiers
            .iter()
            .filter(|id| id.kind == kind)
            .find_map(|id| non_empty(Some(id.identifier.clone())))
    };
    find("ISBN_13").or_else(|| find("ISBN_10"))
}
