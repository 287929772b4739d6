//! Core types for rts-archive-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canonical identifier of the video shown on an archive page
///
/// Taken verbatim from the page's `dcterms.identifier` metadata and used both to
/// build the composition endpoint and to pick the matching chapter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create a new VideoId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for VideoId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VideoId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline stage, used to attribute progress and failures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Configuration and component construction
    Setup,
    /// Archive page metadata lookup
    Page,
    /// Media composition lookup
    Composition,
    /// Master manifest variant selection
    Variant,
    /// Media playlist segment listing
    Segments,
    /// Segment fetching and concatenation
    Fetch,
    /// External remultiplexing
    Mux,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Page => "page",
            Stage::Composition => "composition",
            Stage::Variant => "variant",
            Stage::Segments => "segments",
            Stage::Fetch => "fetch",
            Stage::Mux => "mux",
        };
        f.write_str(name)
    }
}

/// Event emitted during a download run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The archive page yielded its video identifier
    VideoIdentified {
        /// The page that was resolved
        page_url: String,
        /// Identifier found in the page metadata
        video_id: VideoId,
    },

    /// The composition document pointed at a master manifest
    MasterManifestResolved {
        /// Master manifest URL (query stripped)
        url: String,
    },

    /// The highest-bandwidth variant was chosen
    VariantSelected {
        /// Media playlist URL of the chosen variant (query stripped)
        url: String,
    },

    /// The media playlist was split into segment URLs
    SegmentsListed {
        /// Number of segments to fetch
        count: usize,
    },

    /// A segment finished downloading
    ///
    /// `completed` counts finished fetches and only ever increases; it says
    /// nothing about which segment index finished.
    SegmentFetched {
        /// Segments fetched so far
        completed: usize,
        /// Total number of segments
        total: usize,
        /// Size of the segment that just finished
        bytes: u64,
    },

    /// All segments were concatenated and the muxer was started
    Muxing {
        /// Final output path
        output: PathBuf,
        /// Size of the concatenated transport stream
        stream_bytes: u64,
    },

    /// The output file was written
    Complete {
        /// Final output path
        output: PathBuf,
    },

    /// The run failed
    Failed {
        /// Stage that was running when the failure happened
        stage: Stage,
        /// Error message
        error: String,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_serializes_transparently() {
        let id = VideoId::new("4716197");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"4716197\"");
        assert_eq!(id, "4716197");
        assert_eq!(id.to_string(), "4716197");
    }

    #[test]
    fn event_serializes_with_snake_case_type_tag() {
        let event = Event::SegmentFetched {
            completed: 3,
            total: 33,
            bytes: 188,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "segment_fetched");
        assert_eq!(json["completed"], 3);
        assert_eq!(json["total"], 33);
    }

    #[test]
    fn failed_event_carries_lowercase_stage() {
        let event = Event::Failed {
            stage: Stage::Composition,
            error: "no chapter matches video 1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "composition");
    }
}
