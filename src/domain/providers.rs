//! Catalog provider trait definition

use async_trait::async_trait;

use super::{BookQuery, ProviderCandidate, ProviderError};

/// Unified catalog provider trait
///
/// Implemented once per external catalog service (Google Books, Open Library).
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Query the service and return its chosen candidate, if any
    async fn search(&self, query: &BookQuery) -> Result<Option<ProviderCandidate>, ProviderError>;

    /// Fail-soft lookup: any service error is logged and becomes `None`
    async fn lookup(&self, query: &BookQuery) -> Option<ProviderCandidate> {
        match self.search(query).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(
                    "{} lookup failed for '{}' by {}: {}",
                    self.name(),
                    query.title,
                    query.author,
                    e
                );
                None
            }
        }
    }

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
