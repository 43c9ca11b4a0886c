use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::link_builder::{self, LinkBuilder};
use crate::services::match_selector::StrategyKind;
use crate::{google_books, openlibrary};

const USER_AGENT: &str = "booklist-enricher/0.3 (+https://github.com/booklist-enricher)";

#[derive(Clone, Debug)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub rewrite_input: bool,
    pub drop_unresolved: bool,
    pub google_books_url: String,
    pub openlibrary_url: String,
    pub openlibrary_covers_url: String,
    pub link_base_url: String,
    pub affiliate_tag: Option<String>,
    pub http_timeout: Duration,
    pub concurrency: usize,
    pub match_strategy: StrategyKind,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("books.txt"),
            output_path: PathBuf::from("book_metadata.json"),
            rewrite_input: false,
            drop_unresolved: false,
            google_books_url: google_books::DEFAULT_BASE_URL.to_string(),
            openlibrary_url: openlibrary::DEFAULT_BASE_URL.to_string(),
            openlibrary_covers_url: openlibrary::DEFAULT_COVERS_URL.to_string(),
            link_base_url: link_builder::DEFAULT_BASE_URL.to_string(),
            affiliate_tag: None,
            http_timeout: Duration::from_secs(10),
            concurrency: 1,
            match_strategy: StrategyKind::Exact,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let match_strategy = match env::var("MATCH_STRATEGY") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, using exact matching", e);
                defaults.match_strategy
            }),
            Err(_) => defaults.match_strategy,
        };

        let link_base_url = match env::var("LINK_BASE_URL") {
            Ok(value) => match LinkBuilder::new(&value, None) {
                Ok(_) => value,
                Err(e) => {
                    tracing::warn!("{}, using {}", e, defaults.link_base_url);
                    defaults.link_base_url
                }
            },
            Err(_) => defaults.link_base_url,
        };

        Self {
            input_path: env::var("BOOKS_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            output_path: env::var("BOOKS_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            rewrite_input: env_flag("REWRITE_INPUT").unwrap_or(defaults.rewrite_input),
            drop_unresolved: env_flag("DROP_UNRESOLVED").unwrap_or(defaults.drop_unresolved),
            google_books_url: env::var("GOOGLE_BOOKS_URL").unwrap_or(defaults.google_books_url),
            openlibrary_url: env::var("OPENLIBRARY_URL").unwrap_or(defaults.openlibrary_url),
            openlibrary_covers_url: env::var("OPENLIBRARY_COVERS_URL")
                .unwrap_or(defaults.openlibrary_covers_url),
            link_base_url,
            affiliate_tag: env::var("AFFILIATE_TAG")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            http_timeout: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            concurrency: env::var("CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|n: usize| n.max(1))
                .unwrap_or(defaults.concurrency),
            match_strategy,
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}
