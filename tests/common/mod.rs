//! Common test utilities for rts-archive-dl integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod server;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use server::*;

use async_trait::async_trait;
use rts_archive_dl::{Muxer, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Muxer stand-in that copies the assembled stream to the output
#[derive(Default)]
pub struct CopyMuxer {
    /// Every (input, output) pair it was asked to remux
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

#[async_trait]
impl Muxer for CopyMuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<()> {
        self.calls
            .lock()
            .map_err(|_| rts_archive_dl::Error::ExternalTool("poisoned".into()))?
            .push((input.to_path_buf(), output.to_path_buf()));
        tokio::fs::copy(input, output).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}
