//! # rts-archive-dl
//!
//! Downloads videos from the RTS online archives.
//!
//! An archive page is resolved through a chain of dependent documents:
//! page metadata → media composition → HLS master manifest → media playlist.
//! The playlist's transport-stream segments are then fetched with bounded
//! concurrency, concatenated in playlist order and remuxed into a container
//! by `ffmpeg` without re-encoding.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - every stage is a public type that can be driven on its own
//! - **Injectable I/O** - HTTP and the muxer sit behind traits, so the chain runs against fixtures
//! - **Event-driven** - consumers subscribe to progress events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use rts_archive_dl::{ArchiveDownloader, Config};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ArchiveDownloader::new(Config::default())?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     downloader
//!         .download(
//!             "https://www.rts.ch/archives/tv/culture/verso/4716197-gribouille-en-metro.html",
//!             Path::new("gribouille-en-metro.mp4"),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Segment fetching, ordered concatenation and remuxing
pub mod assembler;
/// Media composition lookup
pub mod composition;
/// Configuration types
pub mod config;
/// Archive downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// HTTP fetching
pub mod http;
/// HLS master manifest and media playlist parsing
pub mod manifest;
/// External remultiplexing tool
pub mod mux;
/// Archive page metadata lookup
pub mod page;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;
/// URL and filename helpers
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use downloader::{ArchiveDownloader, DownloadReport, ResolvedVideo};
pub use error::{Error, Result};
pub use http::{Fetcher, HttpFetcher};
pub use mux::{FfmpegMuxer, Muxer};
pub use types::{Event, Stage, VideoId};

use std::path::Path;

/// Run a download, cancelling it on a shutdown signal
///
/// Waits for either the download to finish or SIGTERM/SIGINT (Ctrl+C on
/// non-Unix platforms). On a signal the download is cancelled and allowed to
/// wind down, which releases its scratch directory before
/// [`Error::Cancelled`] is returned.
///
/// # Example
///
/// ```no_run
/// use rts_archive_dl::{ArchiveDownloader, Config, download_with_shutdown};
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = ArchiveDownloader::new(Config::default())?;
///     download_with_shutdown(
///         &downloader,
///         "https://www.rts.ch/archives/tv/culture/verso/4716197-gribouille-en-metro.html",
///         Path::new("gribouille-en-metro.mp4"),
///     )
///     .await?;
///     Ok(())
/// }
/// ```
pub async fn download_with_shutdown(
    downloader: &ArchiveDownloader,
    page_url: &str,
    output: &Path,
) -> Result<DownloadReport> {
    let download = downloader.download(page_url, output);
    tokio::pin!(download);

    tokio::select! {
        result = &mut download => result,
        _ = wait_for_signal() => {
            downloader.cancel();
            download.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
                // No signal source, never cancel
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl+C signal");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
