//! Sequential resolution chain and the assembly run

use std::future::Future;
use std::path::{Path, PathBuf};
use url::Url;

use super::ArchiveDownloader;
use crate::error::{Error, Result};
use crate::types::{Event, Stage, VideoId};
use crate::utils::parse_url;

/// Everything the resolution chain learned about a page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedVideo {
    /// Identifier found in the page metadata
    pub video_id: VideoId,
    /// HD HLS master manifest (query stripped)
    pub master_manifest: Url,
    /// Highest-bandwidth media playlist (query stripped)
    pub variant: Url,
    /// Segment URLs in playback order
    pub segments: Vec<Url>,
}

/// Outcome of a completed download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadReport {
    /// Identifier found in the page metadata
    pub video_id: VideoId,
    /// Number of segments concatenated
    pub segments: usize,
    /// Size of the concatenated transport stream
    pub stream_bytes: u64,
    /// The written output file
    pub output: PathBuf,
}

impl ArchiveDownloader {
    /// Walk the resolution chain for `page_url` without downloading segments
    ///
    /// Stages run strictly in order: page, composition, variant, segments.
    pub async fn resolve(&self, page_url: &str) -> Result<ResolvedVideo> {
        let mut stage = Stage::Page;
        let result = self.resolve_tracked(page_url, &mut stage).await;
        self.report_failure(stage, result)
    }

    /// Download the video shown on `page_url` into `output`
    ///
    /// Emits [`Event`]s for every stage transition and segment. On failure a
    /// [`Event::Failed`] naming the stage that was running is emitted and the
    /// error is returned; no output file is left behind by this run.
    pub async fn download(&self, page_url: &str, output: &Path) -> Result<DownloadReport> {
        let mut stage = Stage::Page;
        let result = self.download_tracked(page_url, output, &mut stage).await;
        self.report_failure(stage, result)
    }

    async fn download_tracked(
        &self,
        page_url: &str,
        output: &Path,
        stage: &mut Stage,
    ) -> Result<DownloadReport> {
        let resolved = self.resolve_tracked(page_url, stage).await?;

        let stream_bytes = self
            .segment_assembler()
            .assemble_tracked(&resolved.segments, output, stage)
            .await?;

        tracing::info!(
            video_id = %resolved.video_id,
            output = %output.display(),
            bytes = stream_bytes,
            "download complete"
        );
        self.emit_event(Event::Complete {
            output: output.to_path_buf(),
        });

        Ok(DownloadReport {
            video_id: resolved.video_id,
            segments: resolved.segments.len(),
            stream_bytes,
            output: output.to_path_buf(),
        })
    }

    async fn resolve_tracked(&self, page_url: &str, stage: &mut Stage) -> Result<ResolvedVideo> {
        *stage = Stage::Page;
        let page_url = parse_url(page_url)?;
        let video_id = self.cancellable(self.page_resolver().resolve(&page_url)).await?;
        self.emit_event(Event::VideoIdentified {
            page_url: page_url.to_string(),
            video_id: video_id.clone(),
        });

        *stage = Stage::Composition;
        let master_manifest = self
            .cancellable(self.composition_client().resolve_master_manifest_url(&video_id))
            .await?;
        self.emit_event(Event::MasterManifestResolved {
            url: master_manifest.to_string(),
        });

        *stage = Stage::Variant;
        let variant = self
            .cancellable(self.variant_selector().select_best_variant(&master_manifest))
            .await?;
        self.emit_event(Event::VariantSelected {
            url: variant.to_string(),
        });

        *stage = Stage::Segments;
        let segments = self
            .cancellable(self.segment_list_resolver().list_segments(&variant))
            .await?;
        if segments.is_empty() {
            tracing::warn!(playlist = %variant, "media playlist lists no segments");
        }
        self.emit_event(Event::SegmentsListed {
            count: segments.len(),
        });

        Ok(ResolvedVideo {
            video_id,
            master_manifest,
            variant,
            segments,
        })
    }

    /// Run a resolution stage unless the download is cancelled first
    async fn cancellable<T>(&self, stage: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(Error::Cancelled),
            result = stage => result,
        }
    }

    fn report_failure<T>(&self, running: Stage, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            let stage = e.stage().unwrap_or(running);
            tracing::error!(stage = %stage, code = e.error_code(), error = %e, "download failed");
            self.emit_event(Event::Failed {
                stage,
                error: e.to_string(),
            });
        }
        result
    }
}
