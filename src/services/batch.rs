//! Batch Driver - resolves a book list and persists the results

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::domain::{BookQuery, CatalogProvider, PipelineError, ResolvedMetadata};
use crate::export;
use crate::google_books::GoogleBooksClient;
use crate::import::{self, SkippedLine};
use crate::isbn;
use crate::openlibrary::OpenLibraryClient;
use crate::services::link_builder::{self, LinkBuilder};
use crate::services::resolver::MetadataResolver;

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One record per query, in input order
    pub resolved: Vec<ResolvedMetadata>,
    /// Records to persist: `resolved` minus dropped unresolved entries
    pub records: Vec<ResolvedMetadata>,
    /// Queries for which no ISBN was found anywhere
    pub unresolved: Vec<BookQuery>,
}

impl BatchReport {
    /// Report for a batch where nothing could be looked up
    fn all_unresolved(queries: &[BookQuery], drop_unresolved: bool) -> Self {
        let resolved: Vec<ResolvedMetadata> = queries.iter().map(unresolved_record).collect();
        Self {
            records: if drop_unresolved { Vec::new() } else { resolved.clone() },
            resolved,
            unresolved: queries.to_vec(),
        }
    }
}

pub struct BatchDriver {
    resolver: Arc<MetadataResolver>,
    concurrency: usize,
    drop_unresolved: bool,
}

impl BatchDriver {
    pub fn new(resolver: MetadataResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            concurrency: 1,
            drop_unresolved: false,
        }
    }

    /// Maximum number of books resolved at the same time (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Omit books without an ISBN from `BatchReport::records`
    pub fn with_drop_unresolved(mut self, drop_unresolved: bool) -> Self {
        self.drop_unresolved = drop_unresolved;
        self
    }

    /// Build the HTTP clients, providers and link builder from configuration.
    ///
    /// An unusable link base URL falls back to the default store.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build client: {}", e)))?;

        let strategy = Arc::from(config.match_strategy.build());
        let primary: Arc<dyn CatalogProvider> = Arc::new(
            GoogleBooksClient::new(client.clone(), config.google_books_url.clone())
                .with_strategy(strategy),
        );
        let secondary: Arc<dyn CatalogProvider> = Arc::new(OpenLibraryClient::new(
            client,
            config.openlibrary_url.clone(),
            config.openlibrary_covers_url.clone(),
        ));
        let links = match LinkBuilder::new(&config.link_base_url, config.affiliate_tag.clone()) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("{}, using {}", e, link_builder::DEFAULT_BASE_URL);
                LinkBuilder::new(link_builder::DEFAULT_BASE_URL, config.affiliate_tag.clone())?
            }
        };

        // The per-call budget covers a whole provider lookup, which may issue
        // two requests (ISBN query, then free text).
        let resolver =
            MetadataResolver::new(primary, secondary, links, config.http_timeout * 2);

        Ok(Self::new(resolver)
            .with_concurrency(config.concurrency)
            .with_drop_unresolved(config.drop_unresolved))
    }

    /// Resolve every query. `buffered` yields results in input order
    /// regardless of completion order.
    pub async fn run(&self, queries: &[BookQuery]) -> BatchReport {
        let resolved: Vec<ResolvedMetadata> = stream::iter(queries.iter().cloned())
            .map(|query| {
                let resolver = Arc::clone(&self.resolver);
                async move { resolver.resolve(&query).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (query, record) in queries.iter().zip(&resolved) {
            match record.isbn.as_deref() {
                Some(found) => {
                    tracing::info!("Got: {} ({})", record.title, found);
                    if !isbn::is_valid_isbn(found) {
                        tracing::warn!(
                            "ISBN {} for '{}' fails its checksum, link may be dead",
                            found,
                            record.title
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        "No ISBN found for '{}' by {}",
                        query.title,
                        query.author
                    );
                    report.unresolved.push(query.clone());
                    if self.drop_unresolved {
                        continue;
                    }
                }
            }
            report.records.push(record.clone());
        }
        report.resolved = resolved;

        report
    }
}

/// Summary of a full pipeline run
#[derive(Debug)]
pub struct PipelineSummary {
    pub report: BatchReport,
    pub skipped: Vec<SkippedLine>,
    /// False when the JSON output could not be written
    pub output_written: bool,
}

/// Read the book list, resolve it, write the JSON output and optionally
/// rewrite the input with discovered ISBNs.
///
/// Only an unreadable input file is an error. Later failures are logged and
/// the remaining steps still run.
pub async fn run_pipeline(config: &Config) -> Result<PipelineSummary, PipelineError> {
    let content = std::fs::read(&config.input_path)
        .map_err(|e| PipelineError::io(&config.input_path, e))?;

    let parsed = import::parse_book_list(&content);
    for skipped in &parsed.skipped {
        tracing::warn!(
            "Skipping malformed line {}: {}",
            skipped.line,
            skipped.reason
        );
    }
    tracing::info!(
        "Resolving {} books from {}",
        parsed.queries.len(),
        config.input_path.display()
    );

    let report = match BatchDriver::from_config(config) {
        Ok(driver) => driver.run(&parsed.queries).await,
        Err(e) => {
            tracing::error!("Cannot look up books: {}", e);
            BatchReport::all_unresolved(&parsed.queries, config.drop_unresolved)
        }
    };

    let output_written = match export::write_metadata_json(&config.output_path, &report.records) {
        Ok(()) => {
            tracing::info!(
                "Results written to {} ({} records, {} unresolved)",
                config.output_path.display(),
                report.records.len(),
                report.unresolved.len()
            );
            true
        }
        Err(e) => {
            tracing::error!("Failed to write results: {}", e);
            false
        }
    };

    if config.rewrite_input {
        if !parsed.skipped.is_empty() {
            tracing::warn!(
                "Rewriting {} drops {} malformed lines",
                config.input_path.display(),
                parsed.skipped.len()
            );
        }
        match import::rewrite_book_list(&config.input_path, &parsed, &report.resolved) {
            Ok(()) => tracing::info!("Updated {} with discovered ISBNs", config.input_path.display()),
            Err(e) => tracing::error!("Failed to update {}: {}", config.input_path.display(), e),
        }
    }

    Ok(PipelineSummary {
        report,
        skipped: parsed.skipped,
        output_written,
    })
}

fn unresolved_record(query: &BookQuery) -> ResolvedMetadata {
    ResolvedMetadata {
        title: query.title.clone(),
        author: query.author.clone(),
        image_url: None,
        synopsis: None,
        isbn: None,
        link: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProviderCandidate, ProviderError};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Returns an ISBN only for titles it knows, after a title-dependent delay
    struct CatalogByTitle;

    #[async_trait]
    impl CatalogProvider for CatalogByTitle {
        async fn search(
            &self,
            query: &BookQuery,
        ) -> Result<Option<ProviderCandidate>, ProviderError> {
            let (isbn, delay_ms) = match query.title.as_str() {
                "Dune" => ("9780441013593", 60),
                "Matilda" => ("9780142410370", 5),
                _ => return Ok(None),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(Some(ProviderCandidate {
                title: query.title.clone(),
                authors: vec![query.author.clone()],
                image_url: Some(format!("https://img/{}", isbn)),
                synopsis: None,
                isbn: Some(isbn.to_string()),
            }))
        }

        fn name(&self) -> &'static str {
            "by-title"
        }
    }

    fn driver() -> BatchDriver {
        let resolver = MetadataResolver::new(
            Arc::new(CatalogByTitle),
            Arc::new(CatalogByTitle),
            LinkBuilder::new("https://www.amazon.co.uk", None).unwrap(),
            Duration::from_secs(2),
        );
        BatchDriver::new(resolver)
    }

    fn queries() -> Vec<BookQuery> {
        vec![
            BookQuery::new("Frank Herbert", "Dune"),
            BookQuery::new("Nobody", "Unwritten"),
            BookQuery::new("Roald Dahl", "Matilda"),
        ]
    }

    #[tokio::test]
    async fn test_run_keeps_input_order_under_concurrency() {
        let report = driver().with_concurrency(3).run(&queries()).await;

        let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Unwritten", "Matilda"]);
        assert_eq!(report.unresolved, vec![BookQuery::new("Nobody", "Unwritten")]);
    }

    #[tokio::test]
    async fn test_run_drops_unresolved_when_asked() {
        let report = driver()
            .with_drop_unresolved(true)
            .run(&queries())
            .await;

        let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Matilda"]);
        assert_eq!(report.unresolved.len(), 1);
    }

    #[tokio::test]
    async fn test_run_empty_batch() {
        let report = driver().run(&[]).await;
        assert!(report.records.is_empty());
        assert!(report.unresolved.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_entries_keep_their_own_results() {
        let queries = vec![
            BookQuery::new("Nobody", "Unwritten"),
            BookQuery::new("Nobody", "Unwritten").with_isbn("9780000000002"),
        ];

        let report = driver().with_drop_unresolved(true).run(&queries).await;

        let isbns: Vec<Option<&str>> = report.resolved.iter().map(|r| r.isbn.as_deref()).collect();
        assert_eq!(isbns, vec![None, Some("9780000000002")]);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.unresolved, vec![queries[0].clone()]);
    }

    #[test]
    fn test_all_unresolved_report() {
        let report = BatchReport::all_unresolved(&queries(), false);
        assert_eq!(report.records.len(), 3);
        assert!(report.resolved.iter().all(|r| r.isbn.is_none()));
        assert_eq!(report.unresolved.len(), 3);

        let dropped = BatchReport::all_unresolved(&queries(), true);
        assert!(dropped.records.is_empty());
        assert_eq!(dropped.resolved.len(), 3);
    }
}
