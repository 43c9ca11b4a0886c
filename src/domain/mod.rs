//! Domain layer - Pure resolution abstractions
//!
//! This layer contains NO HTTP or file-system code.
//! Only the book records, the provider contract and error types.

pub mod errors;
pub mod models;
pub mod providers;

pub use errors::{PipelineError, ProviderError};
pub use models::*;
pub use providers::CatalogProvider;
