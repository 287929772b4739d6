//! Media composition lookup
//!
//! The integration layer describes every video as a *media composition*: a
//! list of chapters, each carrying the streams it can be delivered as. A video
//! archive page maps to exactly one chapter (matched on its analytics segment
//! id), and that chapter must offer exactly one HD HLS stream.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::config::CompositionConfig;
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::types::VideoId;
use crate::utils::{parse_url, strip_query};

/// Quality tag of the resource to download
pub const HD_QUALITY: &str = "HD";

/// MIME types denoting an HLS playlist, compared case-insensitively
pub const HLS_MIME_TYPES: [&str; 2] = ["application/x-mpegURL", "application/vnd.apple.mpegurl"];

/// Composition document returned by the integration layer
///
/// Only the fields the download needs are modelled; everything else in the
/// document is ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaComposition {
    /// Chapters of the composition; absent for pages that are not a single video
    #[serde(default)]
    pub chapter_list: Option<Vec<Chapter>>,
}

/// One addressable unit within a composition
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Analytics labels, holding the chapter's segment id
    #[serde(default)]
    pub analytics_metadata: AnalyticsMetadata,

    /// Deliverable streams of this chapter
    #[serde(default)]
    pub resource_list: Vec<Resource>,
}

impl Chapter {
    /// The chapter's segment id, if labelled
    pub fn segment_id(&self) -> Option<&str> {
        self.analytics_metadata.media_segment_id.as_deref()
    }
}

/// Analytics labels attached to a chapter
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnalyticsMetadata {
    /// Identifier matched against the page's video id
    #[serde(default)]
    pub media_segment_id: Option<String>,
}

/// One deliverable stream descriptor
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Quality tag (`SD`, `HD`, ...)
    #[serde(default)]
    pub quality: String,

    /// MIME type of the document at `url`
    #[serde(default)]
    pub mime_type: String,

    /// Location of the stream; some non-streaming entries carry none
    #[serde(default)]
    pub url: Option<String>,
}

impl Resource {
    /// Whether this is the HD HLS stream
    pub fn is_hd_hls(&self) -> bool {
        self.quality == HD_QUALITY
            && HLS_MIME_TYPES
                .iter()
                .any(|mime| self.mime_type.eq_ignore_ascii_case(mime))
    }
}

/// Build the composition endpoint for a video
///
/// # Examples
///
/// ```
/// use rts_archive_dl::composition::composition_url;
/// use rts_archive_dl::config::CompositionConfig;
/// use rts_archive_dl::VideoId;
///
/// let url = composition_url(&CompositionConfig::default(), &VideoId::new("4716197")).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://il.srgssr.ch/integrationlayer/2.0/mediaComposition/byUrn/urn:rts:video:4716197.json"
/// );
/// ```
pub fn composition_url(config: &CompositionConfig, video_id: &VideoId) -> Result<Url> {
    let relative = format!(
        "mediaComposition/byUrn/{}{}.json",
        config.urn_prefix, video_id
    );
    config
        .base_url
        .join(&relative)
        .map_err(|e| Error::invalid_url(relative, e))
}

/// Find the single chapter matching `video_id`
pub fn select_chapter<'a>(composition: &'a MediaComposition, video_id: &VideoId) -> Result<&'a Chapter> {
    let chapters = composition
        .chapter_list
        .as_ref()
        .ok_or_else(|| Error::NotAVideoArchive {
            video_id: video_id.to_string(),
        })?;

    let matching: Vec<&Chapter> = chapters
        .iter()
        .filter(|chapter| chapter.segment_id() == Some(video_id.as_str()))
        .collect();

    match matching.as_slice() {
        [chapter] => Ok(chapter),
        [] => Err(Error::ChapterNotFound {
            video_id: video_id.to_string(),
        }),
        _ => Err(Error::AmbiguousChapter {
            video_id: video_id.to_string(),
            count: matching.len(),
        }),
    }
}

/// Find the single HD HLS resource of a chapter
pub fn select_hd_resource<'a>(chapter: &'a Chapter, video_id: &VideoId) -> Result<&'a Resource> {
    let matching: Vec<&Resource> = chapter
        .resource_list
        .iter()
        .filter(|resource| resource.is_hd_hls())
        .collect();

    match matching.as_slice() {
        [resource] => Ok(resource),
        [] => Err(Error::ResourceNotFound {
            video_id: video_id.to_string(),
        }),
        _ => Err(Error::AmbiguousResource {
            video_id: video_id.to_string(),
            count: matching.len(),
        }),
    }
}

/// Resolves a [`VideoId`] into its master manifest URL
pub struct CompositionClient {
    fetcher: Arc<dyn Fetcher>,
    config: CompositionConfig,
}

impl CompositionClient {
    /// Create a client for the configured integration layer
    pub fn new(fetcher: Arc<dyn Fetcher>, config: CompositionConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch and decode the composition document for `video_id`
    pub async fn fetch_composition(&self, video_id: &VideoId) -> Result<MediaComposition> {
        let url = composition_url(&self.config, video_id)?;
        tracing::debug!(url = %url, video_id = %video_id, "fetching media composition");
        let body = self.fetcher.fetch_text(&url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Locate the HD HLS master manifest of `video_id`
    ///
    /// The returned URL has its query string removed.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] / [`Error::Serialization`] if the document cannot be fetched or decoded
    /// - [`Error::NotAVideoArchive`] if the document has no chapter list
    /// - [`Error::ChapterNotFound`] / [`Error::AmbiguousChapter`] unless exactly one chapter matches
    /// - [`Error::ResourceNotFound`] / [`Error::AmbiguousResource`] unless exactly one HD HLS resource exists
    /// - [`Error::ResourceNotFound`] if that resource has no URL
    pub async fn resolve_master_manifest_url(&self, video_id: &VideoId) -> Result<Url> {
        let composition = self.fetch_composition(video_id).await?;
        let chapter = select_chapter(&composition, video_id)?;
        let resource = select_hd_resource(chapter, video_id)?;
        let raw = resource
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::ResourceNotFound {
                video_id: video_id.to_string(),
            })?;
        let url = strip_query(parse_url(raw)?);
        tracing::info!(video_id = %video_id, master = %url, "resolved master manifest");
        Ok(url)
    }
}
