//! A wiremock-backed stand-in for the archive site, integration layer and CDN

use super::fixtures::*;
use rts_archive_dl::Config;
use std::path::Path;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server serving one archived video end to end
pub struct ArchiveServer {
    /// The underlying mock server
    pub server: MockServer,
}

impl ArchiveServer {
    /// Start a server with page, composition and a 100k/700k/1200k master manifest
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let archive = Self { server };

        archive.mount_text(PAGE_PATH, page_html(VIDEO_ID)).await;
        Mock::given(method("GET"))
            .and(path(composition_path(VIDEO_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(composition_json(VIDEO_ID, &archive.master_url())),
            )
            .mount(&archive.server)
            .await;
        archive
            .mount_text(
                &format!("{HLS_PREFIX}/master.m3u8"),
                master_manifest(&archive.hls_base(), &[100_000, 700_000, 1_200_000]),
            )
            .await;

        archive
    }

    /// Serve `body` as text at `route`
    pub async fn mount_text(&self, route: &str, body: impl Into<String>) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.into()))
            .mount(&self.server)
            .await;
    }

    /// Serve the 1200k media playlist with `count` segments
    pub async fn mount_playlist(&self, count: usize) {
        self.mount_text(
            &format!("{HLS_PREFIX}/index_2_av.m3u8"),
            media_playlist(&self.hls_base(), count),
        )
        .await;
    }

    /// Serve segment `n` (1-based) after `delay`
    pub async fn mount_segment(&self, n: usize, payload: Vec<u8>, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(format!("{HLS_PREFIX}/segment{n}_2_av.ts")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(payload)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve the three 10/20/30-byte segments, later ones answering faster
    pub async fn mount_reverse_finishing_segments(&self) {
        let payloads = segment_payloads();
        let count = payloads.len();
        for (i, payload) in payloads.into_iter().enumerate() {
            let delay = Duration::from_millis(((count - i - 1) * 100) as u64);
            self.mount_segment(i + 1, payload, delay).await;
        }
    }

    /// The archive page URL
    pub fn page_url(&self) -> String {
        format!("{}{}", self.server.uri(), PAGE_PATH)
    }

    /// Base URL of the HLS bundle
    pub fn hls_base(&self) -> String {
        format!("{}{}", self.server.uri(), HLS_PREFIX)
    }

    /// Master manifest URL, without query
    pub fn master_url(&self) -> String {
        format!("{}/master.m3u8", self.hls_base())
    }

    /// Configuration pointing the composition lookup at this server
    pub fn config(&self, temp_dir: &Path) -> Config {
        let mut config = Config::default();
        config.composition.base_url = Url::parse(&format!("{}/integrationlayer/2.0/", self.server.uri()))
            .unwrap_or_else(|e| panic!("mock server URI is a valid base: {e}"));
        config.download.temp_dir = Some(temp_dir.to_path_buf());
        config.download.max_concurrent_segments = 3;
        config
    }
}
