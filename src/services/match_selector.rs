//! Candidate disambiguation
//!
//! Catalog searches return several editions and namesakes. A `MatchStrategy`
//! picks the one that best fits the query. The default heuristic is simple
//! and known to mismatch common titles (e.g. a study guide sharing the exact
//! title and author); `FuzzyTitleAuthor` is stricter about near-duplicates.

use std::str::FromStr;

use strsim::jaro_winkler;
use unicode_normalization::UnicodeNormalization;

use crate::domain::{BookQuery, ProviderCandidate};

/// Ranks provider candidates against a query
pub trait MatchStrategy: Send + Sync {
    /// Returns `None` only when `candidates` is empty
    fn select<'a>(
        &self,
        candidates: &'a [ProviderCandidate],
        query: &BookQuery,
    ) -> Option<&'a ProviderCandidate>;
}

/// First candidate whose title equals the query title (ignoring case) and
/// whose joined author list contains the query author; otherwise the first
/// candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactTitleAuthor;

impl MatchStrategy for ExactTitleAuthor {
    fn select<'a>(
        &self,
        candidates: &'a [ProviderCandidate],
        query: &BookQuery,
    ) -> Option<&'a ProviderCandidate> {
        let title = query.title.to_lowercase();
        let author = query.author.to_lowercase();

        candidates
            .iter()
            .find(|c| {
                c.title.to_lowercase() == title
                    && c.authors.join(" ").to_lowercase().contains(&author)
            })
            .or_else(|| {
                tracing::debug!(
                    "No exact match for '{}' by {}, using first of {} candidates",
                    query.title,
                    query.author,
                    candidates.len()
                );
                candidates.first()
            })
    }
}

/// Jaro-Winkler title similarity on accent-folded text, author containment
/// required. Highest-scoring acceptable candidate wins, ties go to the
/// earlier one; otherwise the first candidate.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyTitleAuthor {
    pub threshold: f64,
}

impl Default for FuzzyTitleAuthor {
    fn default() -> Self {
        Self { threshold: 0.92 }
    }
}

impl MatchStrategy for FuzzyTitleAuthor {
    fn select<'a>(
        &self,
        candidates: &'a [ProviderCandidate],
        query: &BookQuery,
    ) -> Option<&'a ProviderCandidate> {
        let title = fold(&query.title);
        let author = fold(&query.author);

        let mut best: Option<(&ProviderCandidate, f64)> = None;
        for candidate in candidates {
            if !fold(&candidate.authors.join(" ")).contains(&author) {
                continue;
            }
            let score = jaro_winkler(&fold(&candidate.title), &title);
            if score < self.threshold {
                continue;
            }
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }

        best.map(|(c, _)| c).or_else(|| candidates.first())
    }
}

/// Lower-case, strip diacritics and collapse whitespace
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strategy names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    Exact,
    Fuzzy,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn MatchStrategy> {
        match self {
            StrategyKind::Exact => Box::new(ExactTitleAuthor),
            StrategyKind::Fuzzy => Box::new(FuzzyTitleAuthor::default()),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(StrategyKind::Exact),
            "fuzzy" => Ok(StrategyKind::Fuzzy),
            other => Err(format!("unknown match strategy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, authors: &[&str]) -> ProviderCandidate {
        ProviderCandidate {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match_prefers_exact_title_over_decoy() {
        let candidates = vec![
            candidate("Dune", &["Frank Herbert"]),
            candidate("Dune Messiah", &["Frank Herbert"]),
        ];
        let query = BookQuery::new("Frank Herbert", "Dune");

        let picked = ExactTitleAuthor.select(&candidates, &query).unwrap();
        assert_eq!(picked.title, "Dune");
    }

    #[test]
    fn test_exact_match_skips_earlier_mismatches() {
        let candidates = vec![
            candidate("Dune Messiah", &["Frank Herbert"]),
            candidate("DUNE", &["Brian Herbert", "Frank Herbert"]),
        ];
        let query = BookQuery::new("frank herbert", "Dune");

        let picked = ExactTitleAuthor.select(&candidates, &query).unwrap();
        assert_eq!(picked.title, "DUNE");
    }

    #[test]
    fn test_exact_match_author_is_substring_of_joined_authors() {
        // Surname-only input still matches the full name
        let candidates = vec![
            candidate("Matilda", &["Quentin Blake"]),
            candidate("Matilda", &["Roald Dahl"]),
        ];
        let query = BookQuery::new("Dahl", "Matilda");

        let picked = ExactTitleAuthor.select(&candidates, &query).unwrap();
        assert_eq!(picked.authors, vec!["Roald Dahl".to_string()]);
    }

    #[test]
    fn test_exact_match_falls_back_to_first() {
        let candidates = vec![
            candidate("Dune Messiah", &["Frank Herbert"]),
            candidate("Children of Dune", &["Frank Herbert"]),
        ];
        let query = BookQuery::new("Frank Herbert", "Dune");

        for _ in 0..3 {
            let picked = ExactTitleAuthor.select(&candidates, &query).unwrap();
            assert_eq!(picked.title, "Dune Messiah");
        }
    }

    #[test]
    fn test_empty_candidates() {
        let query = BookQuery::new("Frank Herbert", "Dune");
        assert!(ExactTitleAuthor.select(&[], &query).is_none());
        assert!(FuzzyTitleAuthor::default().select(&[], &query).is_none());
    }

    #[test]
    fn test_fuzzy_match_folds_accents_and_spacing() {
        let candidates = vec![
            candidate("Les Misérables: Tome 2", &["Victor Hugo"]),
            candidate("Les  Miserables", &["Victor Hugo"]),
        ];
        let query = BookQuery::new("Victor Hugo", "Les Misérables");

        let picked = FuzzyTitleAuthor::default()
            .select(&candidates, &query)
            .unwrap();
        assert_eq!(picked.title, "Les  Miserables");
    }

    #[test]
    fn test_fuzzy_match_requires_author() {
        let candidates = vec![
            candidate("Dune: A Study Guide", &["Frank Herbert"]),
            candidate("Dune", &["Anonymous"]),
        ];
        let query = BookQuery::new("Frank Herbert", "Dune");

        // Neither candidate qualifies, so the first one is returned
        let picked = FuzzyTitleAuthor::default()
            .select(&candidates, &query)
            .unwrap();
        assert_eq!(picked.title, "Dune: A Study Guide");
    }

    #[test]
    fn test_strategy_kind_from_str() {
        assert_eq!("exact".parse::<StrategyKind>(), Ok(StrategyKind::Exact));
        assert_eq!(" Fuzzy ".parse::<StrategyKind>(), Ok(StrategyKind::Fuzzy));
        assert!("levenshtein".parse::<StrategyKind>().is_err());
    }
}
