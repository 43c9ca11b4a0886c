//! Resolution Engine - merges provider results into one record per book
//!
//! Field policy is first-writer-wins in provider priority order:
//! primary provider, then secondary provider, then (ISBN only) the ISBN
//! supplied with the query.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{BookQuery, CatalogProvider, ProviderCandidate, ResolvedMetadata};
use crate::services::link_builder::LinkBuilder;

pub struct MetadataResolver {
    primary: Arc<dyn CatalogProvider>,
    secondary: Arc<dyn CatalogProvider>,
    links: LinkBuilder,
    provider_timeout: Duration,
}

/// Fields collected while resolving. Never leaves this module.
#[derive(Default)]
struct Partial {
    image_url: Option<String>,
    synopsis: Option<String>,
    isbn: Option<String>,
}

impl Partial {
    fn fill_from(&mut self, candidate: ProviderCandidate) {
        self.image_url = self.image_url.take().or(candidate.image_url);
        self.synopsis = self.synopsis.take().or(candidate.synopsis);
        self.isbn = self.isbn.take().or(candidate.isbn);
    }
}

impl MetadataResolver {
    pub fn new(
        primary: Arc<dyn CatalogProvider>,
        secondary: Arc<dyn CatalogProvider>,
        links: LinkBuilder,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            links,
            provider_timeout,
        }
    }

    /// Resolve one query. Never fails: missing data leaves fields empty.
    pub async fn resolve(&self, query: &BookQuery) -> ResolvedMetadata {
        let mut partial = Partial::default();

        if let Some(candidate) = self.lookup(self.primary.as_ref(), query).await {
            partial.fill_from(candidate);
        }

        // Missing either the cover or the ISBN triggers the secondary lookup
        if partial.image_url.is_none() || partial.isbn.is_none() {
            tracing::debug!(
                "Falling back to {} for '{}' (image: {}, isbn: {})",
                self.secondary.name(),
                query.title,
                partial.image_url.is_some(),
                partial.isbn.is_some()
            );
            if let Some(candidate) = self.lookup(self.secondary.as_ref(), query).await {
                partial.fill_from(candidate);
            }
        }

        let isbn = partial.isbn.or_else(|| query.isbn.clone());
        let link = self.links.build_link(isbn.as_deref());

        ResolvedMetadata {
            title: query.title.clone(),
            author: query.author.clone(),
            image_url: partial.image_url,
            synopsis: partial.synopsis,
            isbn,
            link,
        }
    }

    async fn lookup(
        &self,
        provider: &dyn CatalogProvider,
        query: &BookQuery,
    ) -> Option<ProviderCandidate> {
        match tokio::time::timeout(self.provider_timeout, provider.lookup(query)).await {
            Ok(candidate) => candidate,
            Err(_) => {
                tracing::warn!(
                    "{} timed out after {:?} for '{}'",
                    provider.name(),
                    self.provider_timeout,
                    query.title
                );
                None
            }
        }
    }
}
