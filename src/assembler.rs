//! Segment fetching, ordered concatenation and remultiplexing
//!
//! Segments are fetched through a bounded window (`max_concurrent_segments`)
//! and may complete in any order, but are yielded in playlist order, so the
//! concatenated stream is always `segment[0] ‖ segment[1] ‖ … ‖ segment[n-1]`.
//! A stalled segment holds back new fetches instead of letting finished
//! payloads pile up in memory: at most `max_concurrent_segments` payloads
//! are held at any time.
//!
//! All intermediate files live in a per-run scratch directory which is
//! removed on every exit path: success, fetch failure, mux failure and
//! cancellation.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::mux::Muxer;
use crate::retry::retry_with_backoff;
use crate::types::{Event, Stage};

/// File name of the concatenated transport stream inside the scratch directory
const CONCAT_FILE_NAME: &str = "concat.ts";

/// The ordered concatenation of all segment payloads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledStream {
    /// Where the stream was written
    pub path: PathBuf,
    /// Total size, equal to the sum of the segment sizes
    pub bytes: u64,
    /// Number of segments concatenated
    pub segments: usize,
}

/// Fetches segments and produces the final output file
pub struct SegmentAssembler {
    fetcher: Arc<dyn Fetcher>,
    muxer: Arc<dyn Muxer>,
    config: Arc<Config>,
    event_tx: broadcast::Sender<Event>,
    cancel_token: CancellationToken,
}

impl SegmentAssembler {
    /// Create an assembler
    ///
    /// Progress is reported on `event_tx`; cancelling `cancel_token` aborts
    /// in-flight fetches and the mux step.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        muxer: Arc<dyn Muxer>,
        config: Arc<Config>,
        event_tx: broadcast::Sender<Event>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            muxer,
            config,
            event_tx,
            cancel_token,
        }
    }

    /// Fetch every segment and write their concatenation to `destination`
    ///
    /// Emits one [`Event::SegmentFetched`] per segment, in completion order,
    /// with a strictly increasing `completed` count. The first failing fetch
    /// aborts the others.
    pub async fn assemble_stream(&self, segments: &[Url], destination: &Path) -> Result<AssembledStream> {
        let total = segments.len();
        let concurrency = self.config.download.max_concurrent_segments.max(1);
        let completed = Arc::new(AtomicUsize::new(0));

        tracing::info!(segments = total, concurrency, "fetching segments");

        let mut fetches = stream::iter(segments.iter().cloned().enumerate())
            .map(|(index, url)| {
                let fetcher = Arc::clone(&self.fetcher);
                let retry = self.config.retry.clone();
                let completed = Arc::clone(&completed);
                let event_tx = self.event_tx.clone();

                async move {
                    let payload = retry_with_backoff(&retry, || fetcher.fetch_bytes(&url)).await?;

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::debug!(index, completed = done, total, bytes = payload.len(), url = %url, "segment fetched");
                    event_tx
                        .send(Event::SegmentFetched {
                            completed: done,
                            total,
                            bytes: payload.len() as u64,
                        })
                        .ok();

                    Ok::<_, Error>(payload)
                }
            })
            .buffered(concurrency);

        let mut file = tokio::io::BufWriter::new(tokio::fs::File::create(destination).await?);
        let mut next_index = 0;
        let mut written: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    tracing::info!(written_segments = next_index, total, "segment fetch cancelled");
                    return Err(Error::Cancelled);
                }
                next = fetches.next() => next,
            };
            let Some(result) = next else { break };
            let payload: Bytes = result?;
            file.write_all(&payload).await?;
            written += payload.len() as u64;
            next_index += 1;
        }
        file.flush().await?;

        Ok(AssembledStream {
            path: destination.to_path_buf(),
            bytes: written,
            segments: next_index,
        })
    }

    /// Fetch, concatenate and remux `segments` into `output`
    ///
    /// Returns the size of the concatenated stream that was handed to the muxer.
    ///
    /// # Errors
    ///
    /// - any fetch error, see [`crate::http::Fetcher`]
    /// - [`Error::MuxFailure`] / [`Error::ExternalTool`] from the muxer
    /// - [`Error::Cancelled`] if the run was cancelled
    /// - [`Error::Io`] for scratch directory problems
    pub async fn assemble(&self, segments: &[Url], output: &Path) -> Result<u64> {
        let mut stage = Stage::Fetch;
        self.assemble_tracked(segments, output, &mut stage).await
    }

    /// Like [`assemble`](Self::assemble), recording the running phase in `stage`
    ///
    /// `stage` is [`Stage::Fetch`] while segments are fetched and becomes
    /// [`Stage::Mux`] once the stream is handed to the muxer, so a failure
    /// can be attributed to the phase that was running.
    pub async fn assemble_tracked(
        &self,
        segments: &[Url],
        output: &Path,
        stage: &mut Stage,
    ) -> Result<u64> {
        *stage = Stage::Fetch;
        let scratch = self.create_scratch_dir()?;
        let result = self.assemble_in(scratch.path(), segments, output, stage).await;
        release_scratch_dir(scratch);
        result
    }

    async fn assemble_in(
        &self,
        scratch: &Path,
        segments: &[Url],
        output: &Path,
        stage: &mut Stage,
    ) -> Result<u64> {
        let stream = self
            .assemble_stream(segments, &scratch.join(CONCAT_FILE_NAME))
            .await?;

        tracing::info!(
            segments = stream.segments,
            bytes = stream.bytes,
            output = %output.display(),
            muxer = self.muxer.name(),
            "segments assembled, remuxing"
        );
        self.event_tx
            .send(Event::Muxing {
                output: output.to_path_buf(),
                stream_bytes: stream.bytes,
            })
            .ok();

        *stage = Stage::Mux;
        let existed_before = tokio::fs::try_exists(output).await.unwrap_or(false);
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => {
                if !existed_before {
                    tokio::fs::remove_file(output).await.ok();
                }
                Err(Error::Cancelled)
            }
            result = self.muxer.remux(&stream.path, output) => result.map(|()| stream.bytes),
        }
    }

    fn create_scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("rts-archive-dl-");
        let scratch = match &self.config.download.temp_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        tracing::debug!(scratch = %scratch.path().display(), "created scratch directory");
        Ok(scratch)
    }
}

/// Remove the scratch directory, logging instead of failing the run
fn release_scratch_dir(scratch: TempDir) {
    let path = scratch.path().to_path_buf();
    match scratch.close() {
        Ok(()) => tracing::debug!(scratch = %path.display(), "removed scratch directory"),
        Err(e) => tracing::warn!(scratch = %path.display(), error = %e, "failed to remove scratch directory"),
    }
}
