//! Basic download example
//!
//! This example demonstrates the core functionality of rts-archive-dl:
//! - Configuring segment concurrency and the ffmpeg binary
//! - Creating a downloader instance
//! - Subscribing to events
//! - Downloading an archive page into an MP4 file
//!
//! Usage: `cargo run --example basic_download -- <page-url> [output]`

use rts_archive_dl::config::{Config, DownloadConfig};
use rts_archive_dl::utils::default_output_filename;
use rts_archive_dl::{ArchiveDownloader, Event, download_with_shutdown};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let page_url = args.next().unwrap_or_else(|| {
        "https://www.rts.ch/archives/tv/culture/verso/4716197-gribouille-en-metro.html".to_string()
    });
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_output_filename(&page_url)));

    // Build configuration
    let config = Config {
        download: DownloadConfig {
            max_concurrent_segments: 8,
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance (fails if ffmpeg is not on PATH)
    let downloader = ArchiveDownloader::new(config)?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::VideoIdentified { video_id, .. } => {
                    println!("✓ Video {}", video_id);
                }
                Event::VariantSelected { url } => {
                    println!("✓ Variant {}", url);
                }
                Event::SegmentFetched {
                    completed, total, ..
                } => {
                    println!("⬇ Segment {}/{}", completed, total);
                }
                Event::Muxing { output, .. } => {
                    println!("🎬 Remuxing into {:?}", output);
                }
                Event::Complete { output } => {
                    println!("✓ Complete: {:?}", output);
                }
                Event::Failed { stage, error } => {
                    println!("✗ Failed during {}: {}", stage, error);
                }
                _ => {}
            }
        }
    });

    // Ctrl+C cancels the download and removes its scratch files
    let report = download_with_shutdown(&downloader, &page_url, &output).await?;
    println!(
        "Wrote {:?} from {} segments ({} bytes)",
        report.output, report.segments, report.stream_bytes
    );

    Ok(())
}
