//! Archive downloader facade
//!
//! [`ArchiveDownloader`] wires the pipeline stages together:
//! - [`pipeline`] - the sequential resolution chain and the assembly run
//!
//! The HTTP client and the muxer are injected as trait objects so the whole
//! chain can run against fixtures.

mod pipeline;


pub use pipeline::{DownloadReport, ResolvedVideo};

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::assembler::SegmentAssembler;
use crate::composition::CompositionClient;
use crate::config::Config;
use crate::error::Result;
use crate::http::{Fetcher, HttpFetcher};
use crate::manifest::{SegmentListResolver, VariantSelector};
use crate::mux::{FfmpegMuxer, Muxer};
use crate::page::PageResolver;
use crate::types::Event;

/// Capacity of the event channel; slow subscribers lag instead of blocking
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Clones share the event channel and the cancellation token.
#[derive(Clone)]
pub struct ArchiveDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// HTTP client used by every stage
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// External remultiplexing step
    pub(crate) muxer: Arc<dyn Muxer>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Cancels the running download; stays cancelled once triggered
    pub(crate) cancel_token: CancellationToken,
}

impl ArchiveDownloader {
    /// Create a downloader using reqwest and the ffmpeg binary
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Config`] if the configuration is invalid
    /// - [`crate::Error::Network`] if the HTTP client cannot be built
    /// - [`crate::Error::NotSupported`] if no ffmpeg binary is configured or found
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.http)?;
        let muxer = FfmpegMuxer::from_config(&config.tools)?;
        tracing::debug!(ffmpeg = %muxer.binary_path().display(), "using ffmpeg");
        Self::with_components(config, Arc::new(fetcher), Arc::new(muxer))
    }

    /// Create a downloader with injected HTTP client and muxer
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        muxer: Arc<dyn Muxer>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            muxer,
            event_tx,
            cancel_token: CancellationToken::new(),
        })
    }

    /// Subscribe to download events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Cancel the running download
    ///
    /// In-flight fetches and the mux step are aborted, the download returns
    /// [`crate::Error::Cancelled`] and its scratch directory is removed.
    pub fn cancel(&self) {
        tracing::info!("download cancellation requested");
        self.cancel_token.cancel();
    }

    /// Whether [`ArchiveDownloader::cancel`] has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Page metadata stage
    pub fn page_resolver(&self) -> PageResolver {
        PageResolver::new(Arc::clone(&self.fetcher))
    }

    /// Composition lookup stage
    pub fn composition_client(&self) -> CompositionClient {
        CompositionClient::new(Arc::clone(&self.fetcher), self.config.composition.clone())
    }

    /// Variant selection stage
    pub fn variant_selector(&self) -> VariantSelector {
        VariantSelector::new(Arc::clone(&self.fetcher))
    }

    /// Segment listing stage
    pub fn segment_list_resolver(&self) -> SegmentListResolver {
        SegmentListResolver::new(Arc::clone(&self.fetcher))
    }

    /// Segment assembly stage
    pub fn segment_assembler(&self) -> SegmentAssembler {
        SegmentAssembler::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.muxer),
            Arc::clone(&self.config),
            self.event_tx.clone(),
            self.cancel_token.clone(),
        )
    }

    /// Emit an event to all subscribers
    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}
