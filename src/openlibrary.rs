use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{BookQuery, CatalogProvider, ProviderCandidate, ProviderError, non_empty};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";

const SEARCH_FIELDS: &str = "title,author_name,isbn,first_sentence";

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchResponse {
    #[serde(default)]
    docs: Vec<OpenLibrarySearchDoc>,
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    isbn: Option<Vec<String>>,
    first_sentence: Option<FirstSentence>,
}

/// `first_sentence` comes back as a plain string or as a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FirstSentence {
    One(String),
    Many(Vec<String>),
}

impl FirstSentence {
    fn into_text(self) -> Option<String> {
        match self {
            FirstSentence::One(s) => non_empty(Some(s)),
            FirstSentence::Many(v) => non_empty(v.into_iter().next()),
        }
    }
}

/// Secondary catalog: Open Library search. Takes the top document as ranked
/// by the service; covers are synthesized from the Covers API by ISBN.
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
    covers_url: String,
}

impl OpenLibraryClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        covers_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            covers_url: covers_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn cover_url(&self, isbn: &str) -> String {
        format!("{}/b/isbn/{}-L.jpg", self.covers_url, isbn)
    }
}

#[async_trait]
impl CatalogProvider for OpenLibraryClient {
    async fn search(&self, query: &BookQuery) -> Result<Option<ProviderCandidate>, ProviderError> {
        let url = format!(
            "{}/search.json?q={}&limit=1&fields={}",
            self.base_url,
            urlencoding::encode(&query.search_text()),
            SEARCH_FIELDS
        );

        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        let parsed: OpenLibrarySearchResponse = serde_json::from_str(&body)?;

        let Some(doc) = parsed.docs.into_iter().next() else {
            return Ok(None);
        };

        let isbn = pick_isbn(doc.isbn.unwrap_or_default());
        let image_url = isbn.as_deref().map(|i| self.cover_url(i));

        Ok(Some(ProviderCandidate {
            title: doc.title.unwrap_or_else(|| query.title.clone()),
            authors: doc
                .author_name
                .unwrap_or_else(|| vec![query.author.clone()]),
            image_url,
            synopsis: doc.first_sentence.and_then(FirstSentence::into_text),
            isbn,
        }))
    }

    fn name(&self) -> &'static str {
        "Open Library"
    }
}

/// First 13-character identifier, else the first one listed
fn pick_isbn(isbns: Vec<String>) -> Option<String> {
    let isbns: Vec<String> = isbns
        .into_iter()
        .filter_map(|i| non_empty(Some(i)))
        .collect();
    isbns
        .iter()
        .find(|i| i.len() == 13)
        .or_else(|| isbns.first())
        .cloned()
}
