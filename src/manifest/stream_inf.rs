//! `#EXT-X-STREAM-INF` directives, decoded with `hls_m3u8`
//!
//! The attribute list is tokenized by the crate, so quoted values such as
//! `CODECS="avc1.77.30, mp4a.40.2"` keep their commas.

use hls_m3u8::MasterPlaylist;
use hls_m3u8::tags::VariantStream;

/// Attributes of one variant directive that drive variant selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInf {
    /// Declared bitrate in bits per second
    pub bandwidth: u64,
    /// Codec list, if declared
    pub codecs: Option<String>,
}

/// Decode a variant directive together with the URI line that follows it
///
/// Returns the crate's parse error as text when the directive carries no
/// integer `BANDWIDTH` or is not a variant stream at all.
///
/// # Examples
///
/// ```
/// use rts_archive_dl::manifest::parse_stream_inf;
///
/// let inf = parse_stream_inf(
///     r#"#EXT-X-STREAM-INF:BANDWIDTH=1200000,CODECS="avc1.77.30,mp4a.40.2""#,
///     "https://cdn.example/index_2_av.m3u8",
/// )
/// .unwrap();
/// assert_eq!(inf.bandwidth, 1_200_000);
/// ```
pub fn parse_stream_inf(directive: &str, uri: &str) -> std::result::Result<StreamInf, String> {
    let document = format!("#EXTM3U\n{}\n{}\n", directive, uri);
    let playlist = MasterPlaylist::try_from(document.as_str()).map_err(|e| e.to_string())?;

    match playlist.variant_streams.first() {
        Some(VariantStream::ExtXStreamInf { stream_data, .. }) => Ok(StreamInf {
            bandwidth: stream_data.bandwidth(),
            codecs: stream_data.codecs().map(|c| c.to_string()),
        }),
        Some(VariantStream::ExtXIFrame { .. }) => {
            Err("I-frame directive where a variant stream was expected".to_string())
        }
        None => Err("directive does not describe a variant stream".to_string()),
    }
}
