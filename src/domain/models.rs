use serde::{Deserialize, Serialize};

/// One entry of the input book list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub author: String,
    pub title: String,
    pub isbn: Option<String>,
}

impl BookQuery {
    pub fn new(author: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            isbn: None,
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = non_empty(Some(isbn.into()));
        self
    }

    /// Free-text form sent to catalog search endpoints
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.author)
    }
}

/// A single record reported by a catalog service, before disambiguation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderCandidate {
    pub title: String,
    pub authors: Vec<String>,
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    pub isbn: Option<String>,
}

/// Final, merged metadata for one book. This is the unit of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    pub isbn: Option<String>,
    pub link: Option<String>,
}

impl ResolvedMetadata {
    pub fn is_resolved(&self) -> bool {
        self.isbn.is_some()
    }
}

/// Treats blank strings the same as a missing value
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
