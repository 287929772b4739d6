//! Media playlist segment listing

use std::sync::Arc;
use url::Url;

use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::utils::strip_query;

/// Extract the segment URLs of a media playlist, in playback order
///
/// The text is split on `\n` and its final line (the terminator, normally
/// empty) is discarded. Lines starting with `#` and blank lines are skipped.
/// Every other line is a segment URI: relative URIs are resolved against
/// `playlist_url`, and query strings are removed.
pub fn parse_media_playlist(text: &str, playlist_url: &Url) -> Result<Vec<Url>> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.pop();

    lines
        .into_iter()
        .map(|line| line.trim_end_matches('\r').trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            playlist_url
                .join(line)
                .map(strip_query)
                .map_err(|e| Error::invalid_url(line, e))
        })
        .collect()
}

/// Lists the segments of a variant's media playlist
pub struct SegmentListResolver {
    fetcher: Arc<dyn Fetcher>,
}

impl SegmentListResolver {
    /// Create a resolver that fetches playlists through `fetcher`
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the media playlist and return its segment URLs in order
    pub async fn list_segments(&self, playlist_url: &Url) -> Result<Vec<Url>> {
        let text = self.fetcher.fetch_text(playlist_url).await?;
        let segments = parse_media_playlist(&text, playlist_url)?;
        tracing::info!(playlist = %playlist_url, segments = segments.len(), "listed segments");
        Ok(segments)
    }
}
