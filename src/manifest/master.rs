//! Master manifest parsing and variant selection

use std::sync::Arc;
use url::Url;

use super::stream_inf::parse_stream_inf;
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::utils::strip_query;

/// Directive introducing a variant in a master manifest
pub const STREAM_INF_PREFIX: &str = "#EXT-X-STREAM-INF:";

/// One quality variant listed in a master manifest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistVariant {
    /// Declared bitrate in bits per second
    pub bandwidth: u64,
    /// Media playlist of the variant, as written in the manifest
    pub url: Url,
}

/// Parse a master manifest into its variants, in file order
///
/// Line 1 is the format header and is ignored, as are trailing blank lines.
/// The remaining lines must alternate between an `#EXT-X-STREAM-INF:`
/// directive carrying an integer `BANDWIDTH` and an absolute http(s) URL.
/// CRLF line endings are accepted.
///
/// # Errors
///
/// [`Error::MalformedManifest`] with the 1-based number of the first line
/// breaking that structure.
pub fn parse_master_manifest(text: &str) -> Result<Vec<PlaylistVariant>> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let mut variants = Vec::new();
    // Header is line 1, so the first pair starts at line 2
    for (pair_index, pair) in lines.get(1..).unwrap_or_default().chunks(2).enumerate() {
        let directive_line = 2 + pair_index * 2;

        let directive = pair[0].trim_end();
        if !directive.starts_with(STREAM_INF_PREFIX) {
            return Err(Error::malformed(
                directive_line,
                format!("expected a line starting with {}", STREAM_INF_PREFIX),
            ));
        }

        let Some(url_line) = pair.get(1) else {
            return Err(Error::malformed(
                directive_line,
                "variant directive is not followed by a URL line",
            ));
        };
        let url = parse_absolute(url_line.trim(), directive_line + 1)?;

        let bandwidth = parse_stream_inf(directive, url.as_str())
            .map_err(|reason| Error::malformed(directive_line, reason))?
            .bandwidth;

        variants.push(PlaylistVariant { bandwidth, url });
    }

    Ok(variants)
}

fn parse_absolute(line: &str, line_number: usize) -> Result<Url> {
    match Url::parse(line) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        Ok(url) => Err(Error::malformed(
            line_number,
            format!("unsupported URL scheme '{}'", url.scheme()),
        )),
        Err(e) => Err(Error::malformed(
            line_number,
            format!("expected an absolute URL, got '{}': {}", line, e),
        )),
    }
}

/// Pick the highest-bandwidth variant
///
/// Ties go to the variant listed first.
pub fn best_variant(variants: &[PlaylistVariant]) -> Option<&PlaylistVariant> {
    variants.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.bandwidth <= current.bandwidth => Some(current),
        _ => Some(candidate),
    })
}

/// Selects the media playlist to download from a master manifest
pub struct VariantSelector {
    fetcher: Arc<dyn Fetcher>,
}

impl VariantSelector {
    /// Create a selector that fetches manifests through `fetcher`
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the master manifest and return its best variant's URL, query stripped
    pub async fn select_best_variant(&self, master_url: &Url) -> Result<Url> {
        let text = self.fetcher.fetch_text(master_url).await?;
        let variants = parse_master_manifest(&text)?;

        let best = best_variant(&variants).ok_or_else(|| Error::NoVariants {
            url: master_url.to_string(),
        })?;

        tracing::info!(
            variants = variants.len(),
            bandwidth = best.bandwidth,
            url = %best.url,
            "selected variant"
        );
        Ok(strip_query(best.url.clone()))
    }
}
