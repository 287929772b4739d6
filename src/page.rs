//! Archive page metadata lookup
//!
//! An archive page identifies the video it shows through a
//! `<meta name="dcterms.identifier" content="...">` element. The page is only
//! scanned for `<meta>` tags; nothing else in the document is interpreted.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::types::VideoId;

/// Metadata name carrying the canonical content identifier
pub const IDENTIFIER_META_NAME: &str = "dcterms.identifier";

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<meta\b[^>]*>").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

static TAG_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Extract the video identifier from an archive page's HTML
///
/// Returns the `content` of the first `<meta>` element whose `name` is
/// `dcterms.identifier` (attribute names and the metadata name are matched
/// case-insensitively, attribute order and quoting style do not matter).
/// Elements with an empty or missing `content` are skipped.
///
/// # Examples
///
/// ```
/// use rts_archive_dl::page::extract_video_id;
///
/// let html = r#"<head><meta name="dcterms.identifier" content="4716197"></head>"#;
/// assert_eq!(extract_video_id(html).unwrap().as_str(), "4716197");
/// ```
#[must_use]
pub fn extract_video_id(html: &str) -> Option<VideoId> {
    META_TAG.find_iter(html).find_map(|tag| {
        let mut name = None;
        let mut content = None;
        for caps in TAG_ATTRIBUTE.captures_iter(tag.as_str()) {
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            if key.eq_ignore_ascii_case("name") {
                name = Some(value);
            } else if key.eq_ignore_ascii_case("content") {
                content = Some(value);
            }
        }

        let is_identifier = name.is_some_and(|n| n.trim().eq_ignore_ascii_case(IDENTIFIER_META_NAME));
        match content.map(str::trim) {
            Some(id) if is_identifier && !id.is_empty() => Some(VideoId::new(id)),
            _ => None,
        }
    })
}

/// Resolves an archive page URL into its [`VideoId`]
pub struct PageResolver {
    fetcher: Arc<dyn Fetcher>,
}

impl PageResolver {
    /// Create a resolver that fetches pages through `fetcher`
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the page and extract its identifier
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] if the page cannot be fetched
    /// - [`Error::NotAVideoPage`] if the identifier metadata is absent
    pub async fn resolve(&self, page_url: &Url) -> Result<VideoId> {
        let html = self.fetcher.fetch_text(page_url).await?;
        let video_id = extract_video_id(&html).ok_or_else(|| Error::NotAVideoPage {
            url: page_url.to_string(),
        })?;
        tracing::info!(page_url = %page_url, video_id = %video_id, "resolved video identifier");
        Ok(video_id)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::http::HttpFetcher;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="description" content="Gribouille en métro">
  <meta name="dcterms.identifier" content="4716197">
  <title>Gribouille en métro - Archives RTS</title>
</head>
<body><h1>Gribouille en métro</h1></body>
</html>"#;

    #[test]
    fn extracts_identifier_from_page() {
        assert_eq!(extract_video_id(PAGE).unwrap(), "4716197");
    }

    #[test]
    fn attribute_order_and_quoting_do_not_matter() {
        let html = "<META CONTENT='123' Name='DCTERMS.IDENTIFIER'/>";
        assert_eq!(extract_video_id(html).unwrap(), "123");

        let html = "<meta content=987 name=dcterms.identifier>";
        assert_eq!(extract_video_id(html).unwrap(), "987");
    }

    #[test]
    fn multiline_meta_tag_is_recognised() {
        let html = "<meta\n    name=\"dcterms.identifier\"\n    content=\" 42 \"\n>";
        assert_eq!(extract_video_id(html).unwrap(), "42");
    }

    #[test]
    fn other_meta_names_are_ignored() {
        let html = r#"<meta name="dcterms.title" content="Title"><meta property="og:video" content="x">"#;
        assert!(extract_video_id(html).is_none());
    }

    #[test]
    fn empty_content_is_skipped_in_favour_of_later_tag() {
        let html = r#"<meta name="dcterms.identifier" content=""><meta name="dcterms.identifier" content="55">"#;
        assert_eq!(extract_video_id(html).unwrap(), "55");
    }

    #[test]
    fn missing_content_attribute_yields_none() {
        assert!(extract_video_id(r#"<meta name="dcterms.identifier">"#).is_none());
    }

    #[tokio::test]
    async fn resolve_fetches_page_and_extracts_identifier() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archives/tv/culture/verso/4716197-gribouille-en-metro.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap());
        let resolver = PageResolver::new(fetcher);
        let url = Url::parse(&format!(
            "{}/archives/tv/culture/verso/4716197-gribouille-en-metro.html",
            mock_server.uri()
        ))
        .unwrap();

        assert_eq!(resolver.resolve(&url).await.unwrap(), "4716197");
    }

    #[tokio::test]
    async fn page_without_identifier_is_not_a_video_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archives/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap());
        let resolver = PageResolver::new(fetcher);
        let url = Url::parse(&format!("{}/archives/index.html", mock_server.uri())).unwrap();

        match resolver.resolve(&url).await {
            Err(Error::NotAVideoPage { url: reported }) => assert_eq!(reported, url.to_string()),
            other => panic!("Expected NotAVideoPage, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_error_propagates_as_network_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap());
        let resolver = PageResolver::new(fetcher);
        let url = Url::parse(&format!("{}/page.html", mock_server.uri())).unwrap();

        assert!(matches!(resolver.resolve(&url).await, Err(Error::Network(_))));
    }
}
