use url::Url;

use crate::domain::PipelineError;

pub const DEFAULT_BASE_URL: &str = "https://www.amazon.co.uk";

/// Builds the external reference (store) link for a resolved ISBN.
///
/// The ISBN is used literally. No checksum validation happens here, so an
/// invalid ISBN still produces a well-formed (if dead) link.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: Url,
    affiliate_tag: Option<String>,
}

impl LinkBuilder {
    pub fn new(base_url: &str, affiliate_tag: Option<String>) -> Result<Self, PipelineError> {
        let base = Url::parse(base_url)
            .map_err(|e| PipelineError::Config(format!("invalid link base URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(PipelineError::Config(format!(
                "link base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            base,
            affiliate_tag: affiliate_tag.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn build_link(&self, isbn: Option<&str>) -> Option<String> {
        let isbn = isbn.map(str::trim).filter(|i| !i.is_empty())?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["dp", isbn, "ref=nosim"]);
        if let Some(tag) = &self.affiliate_tag {
            url.query_pairs_mut().append_pair("tag", tag);
        }

        Some(url.into())
    }
}
