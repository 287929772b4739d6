//! URL normalization and output filename helpers

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Matches the numeric id prefix of an archive page slug (`3452662-le-metro`)
static ID_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+-(.+)$").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Remove the query string (and anything after it) from a URL string
///
/// Query parameters are not part of a playlist's or segment's identity, so
/// every URL is normalized through this before it is dereferenced or compared.
/// Stripping is idempotent.
///
/// # Examples
///
/// ```
/// use rts_archive_dl::utils::strip_query_params;
///
/// assert_eq!(
///     strip_query_params("https://cdn.example/index_2_av.m3u8?null=0&id=AgB"),
///     "https://cdn.example/index_2_av.m3u8"
/// );
/// assert_eq!(strip_query_params("https://cdn.example/a.ts"), "https://cdn.example/a.ts");
/// ```
#[must_use]
pub fn strip_query_params(url: &str) -> &str {
    match url.split_once('?') {
        Some((base, _)) => base,
        None => url,
    }
}

/// [`strip_query_params`] for an already parsed [`Url`]
#[must_use]
pub fn strip_query(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Parse a URL string, attaching the input to the error
pub fn parse_url(input: &str) -> crate::Result<Url> {
    Url::parse(input).map_err(|e| crate::Error::invalid_url(input, e))
}

/// Derive a default output filename from an archive page URL
///
/// Takes the last path segment, removes an `.html` suffix and a leading
/// `<digits>-` id prefix, and appends `.mp4`. Falls back to `video.mp4` when
/// nothing usable remains.
///
/// # Examples
///
/// ```
/// use rts_archive_dl::utils::default_output_filename;
///
/// assert_eq!(
///     default_output_filename(
///         "https://www.rts.ch/archives/tv/culture/verso/3452662-le-metro-de-l-expo.html"
///     ),
///     "le-metro-de-l-expo.mp4"
/// );
/// ```
#[must_use]
pub fn default_output_filename(page_url: &str) -> String {
    let last = match Url::parse(page_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or("")
            .to_string(),
        Err(_) => strip_query_params(page_url)
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
            .to_string(),
    };
    let stem = last.strip_suffix(".html").unwrap_or(&last);

    let name = match ID_PREFIX.captures(stem).and_then(|c| c.get(1)) {
        Some(slug) => slug.as_str(),
        None => stem,
    };

    let sanitized: String = name
        .chars()
        .filter(|c| !matches!(c, '\\' | ':' | '*' | '"' | '<' | '>' | '|' | '#'))
        .collect();

    if sanitized.is_empty() {
        "video.mp4".to_string()
    } else {
        format!("{}.mp4", sanitized)
    }
}
