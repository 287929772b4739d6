//! Remultiplexing the assembled transport stream into the output container
//!
//! The assembled stream is handed to an external tool that copies the audio
//! and video streams into the output file without re-encoding them.
//!
//! ## Usage
//!
//! ```no_run
//! use rts_archive_dl::mux::{FfmpegMuxer, Muxer};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let muxer = FfmpegMuxer::from_path().expect("ffmpeg not found in PATH");
//! muxer.remux(Path::new("concat.ts"), Path::new("gribouille-en-metro.mp4")).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::ToolsConfig;
use crate::error::{Error, Result};

/// Number of trailing stderr lines kept in [`Error::MuxFailure`]
const STDERR_TAIL_LINES: usize = 20;

/// Trait for the external remultiplexing step
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Copy the streams of `input` into the container at `output`
    ///
    /// Must fail rather than report success when the output was not fully written.
    async fn remux(&self, input: &Path, output: &Path) -> Result<()>;

    /// Name of the implementation, for logging
    fn name(&self) -> &'static str;
}

/// [`Muxer`] running the external `ffmpeg` binary with stream copy
pub struct FfmpegMuxer {
    binary_path: PathBuf,
    overwrite: bool,
}

impl FfmpegMuxer {
    /// Create a muxer with an explicit binary path
    ///
    /// Existing output files are not overwritten; see [`FfmpegMuxer::overwrite`].
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            overwrite: false,
        }
    }

    /// Attempt to find ffmpeg in PATH
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Build a muxer from the tools configuration
    ///
    /// An explicit `ffmpeg_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] if no binary is configured or found.
    pub fn from_config(config: &ToolsConfig) -> Result<Self> {
        let muxer = match (&config.ffmpeg_path, config.search_path) {
            (Some(path), _) => Self::new(path.clone()),
            (None, true) => Self::from_path().ok_or_else(|| {
                Error::NotSupported("ffmpeg not found in PATH; set tools.ffmpeg_path".into())
            })?,
            (None, false) => {
                return Err(Error::NotSupported(
                    "no ffmpeg_path configured and PATH search is disabled".into(),
                ));
            }
        };
        Ok(muxer.overwrite(config.overwrite_output))
    }

    /// Whether an existing output file may be replaced
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Path of the binary that will be executed
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<()> {
        let existed_before = tokio::fs::try_exists(output).await.unwrap_or(false);

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            "remuxing with {}",
            self.binary_path.display()
        );

        let result = Command::new(&self.binary_path)
            .args(["-hide_banner", "-loglevel", "error"])
            .arg(if self.overwrite { "-y" } else { "-n" })
            .arg("-i")
            .arg(input)
            .args(["-acodec", "copy", "-vcodec", "copy"])
            .arg(output)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute ffmpeg: {}", e)))?;

        if result.status.success() {
            return Ok(());
        }

        if !existed_before && let Err(e) = tokio::fs::remove_file(output).await {
            tracing::debug!(output = %output.display(), error = %e, "no partial output to remove");
        }

        Err(Error::MuxFailure {
            output: output.to_path_buf(),
            code: result.status.code(),
            stderr: stderr_tail(&result.stderr),
        })
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
