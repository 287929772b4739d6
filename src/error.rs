//! Error types for rts-archive-dl
//!
//! Every stage of the resolution chain reports failures through the single
//! [`Error`] enum. Each variant carries enough context (URL, video id, match
//! count, manifest line, exit status) to tell which stage failed and why, and
//! [`Error::stage`] maps a variant back to the [`Stage`] that raised it.

use crate::types::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rts-archive-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rts-archive-dl
#[derive(Debug, Error)]
pub enum Error {
    /// A fetch failed at the transport or HTTP level (connect, timeout, non-2xx status)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The archive page has no canonical content identifier metadata
    #[error("not a video page: {url} has no dcterms.identifier metadata")]
    NotAVideoPage {
        /// The page that was inspected
        url: String,
    },

    /// The composition document has no chapter list
    #[error("video {video_id} does not seem to be a video archive (no chapter list)")]
    NotAVideoArchive {
        /// The video identifier that was looked up
        video_id: String,
    },

    /// No chapter's analytics identifier matches the requested video
    #[error("no chapter matches video {video_id}")]
    ChapterNotFound {
        /// The video identifier that was looked up
        video_id: String,
    },

    /// More than one chapter matches the requested video
    #[error("{count} chapters match video {video_id}, expected exactly one")]
    AmbiguousChapter {
        /// The video identifier that was looked up
        video_id: String,
        /// How many chapters matched
        count: usize,
    },

    /// The matching chapter has no HD HLS resource
    #[error("chapter for video {video_id} has no HD HLS resource")]
    ResourceNotFound {
        /// The video identifier that was looked up
        video_id: String,
    },

    /// The matching chapter has more than one HD HLS resource
    #[error("{count} HD HLS resources for video {video_id}, expected exactly one")]
    AmbiguousResource {
        /// The video identifier that was looked up
        video_id: String,
        /// How many resources matched
        count: usize,
    },

    /// The master manifest violates its line structure
    #[error("malformed manifest at line {line}: {reason}")]
    MalformedManifest {
        /// 1-based line number of the offending line
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The master manifest lists no variants
    #[error("master manifest {url} lists no variants")]
    NoVariants {
        /// The manifest that was parsed
        url: String,
    },

    /// The external remultiplexing tool exited unsuccessfully
    #[error("remux into {output} failed (exit code {code:?}): {stderr}")]
    MuxFailure {
        /// The output file that was being produced
        output: PathBuf,
        /// Process exit code, `None` if killed by a signal
        code: Option<i32>,
        /// Tail of the tool's standard error
        stderr: String,
    },

    /// A URL could not be parsed or joined
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The offending input
        url: String,
        /// The underlying parse error
        source: url::ParseError,
    },

    /// JSON decoding error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (scratch files, concatenated stream, output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool could not be executed
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message
        message: String,
        /// The configuration key that caused the error
        key: Option<String>,
    },

    /// The run was cancelled before it finished
    #[error("download cancelled")]
    Cancelled,
}

impl Error {
    /// Build an [`Error::InvalidUrl`] from the raw input and its parse error
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Build an [`Error::MalformedManifest`] for a 1-based line number
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            line,
            reason: reason.into(),
        }
    }

    /// The pipeline stage that raises this error, if only one stage can
    ///
    /// Network, URL, decoding and I/O errors and cancellation can occur in
    /// any stage and return `None`; the downloader labels those with the
    /// stage it was running.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::NotAVideoPage { .. } => Some(Stage::Page),
            Error::NotAVideoArchive { .. }
            | Error::ChapterNotFound { .. }
            | Error::AmbiguousChapter { .. }
            | Error::ResourceNotFound { .. }
            | Error::AmbiguousResource { .. } => Some(Stage::Composition),
            Error::MalformedManifest { .. } | Error::NoVariants { .. } => Some(Stage::Variant),
            Error::MuxFailure { .. } | Error::ExternalTool(_) => Some(Stage::Mux),
            Error::NotSupported(_) | Error::Config { .. } => Some(Stage::Setup),
            Error::Network(_)
            | Error::InvalidUrl { .. }
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Cancelled => None,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Network(_) => "network_error",
            Error::NotAVideoPage { .. } => "not_a_video_page",
            Error::NotAVideoArchive { .. } => "not_a_video_archive",
            Error::ChapterNotFound { .. } => "chapter_not_found",
            Error::AmbiguousChapter { .. } => "ambiguous_chapter",
            Error::ResourceNotFound { .. } => "resource_not_found",
            Error::AmbiguousResource { .. } => "ambiguous_resource",
            Error::MalformedManifest { .. } => "malformed_manifest",
            Error::NoVariants { .. } => "no_variants",
            Error::MuxFailure { .. } => "mux_failure",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Config { .. } => "config_error",
            Error::Cancelled => "cancelled",
        }
    }
}
