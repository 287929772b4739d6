//! Configuration types for rts-archive-dl

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::error::{Error, Result};

/// HTTP client behaviour shared by every fetch in the chain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Deadline for a single request, body included (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Deadline for establishing a connection (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Where the media composition endpoint lives
///
/// The endpoint for a video is
/// `{base_url}mediaComposition/byUrn/{urn_prefix}{video_id}.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Integration layer base URL, with trailing slash
    #[serde(default = "default_composition_base_url")]
    pub base_url: Url,

    /// URN namespace prepended to the video identifier
    #[serde(default = "default_urn_prefix")]
    pub urn_prefix: String,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            base_url: default_composition_base_url(),
            urn_prefix: default_urn_prefix(),
        }
    }
}

/// Segment download behaviour
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Maximum number of segments fetched concurrently (default: 4)
    #[serde(default = "default_max_concurrent_segments")]
    pub max_concurrent_segments: usize,

    /// Parent directory for scratch directories (default: system temp dir)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_segments: default_max_concurrent_segments(),
            temp_dir: None,
        }
    }
}

/// External remultiplexing tool configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Overwrite an existing output file instead of failing (default: false)
    #[serde(default)]
    pub overwrite_output: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
            overwrite_output: false,
        }
    }
}

/// Retry configuration for transient segment fetch failures
///
/// Retries are off by default: a network error propagates on the first
/// failure. Raising `max_attempts` only affects segment fetches; the
/// resolution chain never retries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for ArchiveDownloader
///
/// Every field has a default, so `Config::default()` talks to the public RTS
/// integration layer and looks for `ffmpeg` on PATH.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Composition endpoint settings
    #[serde(default)]
    pub composition: CompositionConfig,

    /// Segment download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Retry settings for segment fetches
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_segments == 0 {
            return Err(Error::Config {
                message: "max_concurrent_segments must be at least 1".into(),
                key: Some("max_concurrent_segments".into()),
            });
        }
        if self.composition.base_url.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!(
                    "composition base_url '{}' cannot be used as a base",
                    self.composition.base_url
                ),
                key: Some("composition.base_url".into()),
            });
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(Error::Config {
                message: "backoff_multiplier must be >= 1.0".into(),
                key: Some("retry.backoff_multiplier".into()),
            });
        }
        Ok(())
    }
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("rts-archive-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_composition_base_url() -> Url {
    // Constant input, parse cannot fail
    Url::parse("https://il.srgssr.ch/integrationlayer/2.0/")
        .unwrap_or_else(|_| unreachable!("constant base URL is valid"))
}

fn default_urn_prefix() -> String {
    "urn:rts:video:".to_string()
}

fn default_max_concurrent_segments() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
