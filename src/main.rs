use clap::{Parser, ValueEnum};
use rts_archive_dl::utils::default_output_filename;
use rts_archive_dl::{ArchiveDownloader, Config, Event, download_with_shutdown};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Download a video from the RTS archives")]
struct Args {
    /// Archive page URL, e.g. https://www.rts.ch/archives/tv/.../4716197-gribouille-en-metro.html
    page_url: String,

    /// Output file (default: derived from the page URL)
    output: Option<PathBuf>,

    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of segments fetched concurrently
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Parent directory for scratch files
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Replace an existing output file
    #[arg(short = 'y', long, action = clap::ArgAction::SetTrue)]
    overwrite: bool,

    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

impl Args {
    fn load_config(&self) -> rts_archive_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
            None => Config::default(),
        };
        if let Some(concurrency) = self.concurrency {
            config.download.max_concurrent_segments = concurrency;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.tools.ffmpeg_path = Some(ffmpeg.clone());
        }
        if let Some(temp_dir) = &self.temp_dir {
            config.download.temp_dir = Some(temp_dir.clone());
        }
        if self.overwrite {
            config.tools.overwrite_output = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .compact()
        .with_target(false)
        .with_max_level(LevelFilter::from(args.log_level))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", e);
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> rts_archive_dl::Result<()> {
    let config = args.load_config()?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_filename(&args.page_url)));

    let downloader = ArchiveDownloader::new(config)?;

    let mut events = downloader.subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::VideoIdentified { video_id, .. } => {
                    tracing::info!(video_id = %video_id, "found video");
                }
                Event::SegmentsListed { count } => {
                    tracing::info!("downloading {} segments", count);
                }
                Event::SegmentFetched { completed, total, .. } => {
                    tracing::info!("segment {}/{}", completed, total);
                }
                Event::Muxing { output, .. } => {
                    tracing::info!(output = %output.display(), "remuxing");
                }
                Event::Complete { .. } | Event::Failed { .. } => break,
                _ => {}
            }
        }
    });

    let result = download_with_shutdown(&downloader, &args.page_url, &output).await;
    progress.abort();

    let report = result?;
    println!(
        "{} ({} segments, {} bytes)",
        report.output.display(),
        report.segments,
        report.stream_bytes
    );
    Ok(())
}
