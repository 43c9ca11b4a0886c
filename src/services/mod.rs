//! Services Layer
//!
//! Resolution logic on top of the domain abstractions: candidate
//! selection, field merging, link building and the batch driver.

pub mod batch;
pub mod link_builder;
pub mod match_selector;
pub mod resolver;

// Re-export for convenience
pub use batch::{BatchDriver, BatchReport, PipelineSummary, run_pipeline};
pub use link_builder::LinkBuilder;
pub use match_selector::{ExactTitleAuthor, FuzzyTitleAuthor, MatchStrategy, StrategyKind};
pub use resolver::MetadataResolver;
