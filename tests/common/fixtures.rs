//! Archive documents modelled on the "Gribouille en métro" Verso episode

use serde_json::json;

/// Identifier in the archive page metadata
pub const VIDEO_ID: &str = "4716197";

/// Path of the archive page on the mock server
pub const PAGE_PATH: &str = "/archives/tv/culture/verso/4716197-gribouille-en-metro.html";

/// Path of the HLS bundle on the mock server
pub const HLS_PREFIX: &str =
    "/i/1998/vers/vers_19980407_standard_vers_1998-04-07_Arch00_094728-,100k,700k,1200k,.mp4.csmil";

/// Path of the composition document for [`VIDEO_ID`]
pub fn composition_path(video_id: &str) -> String {
    format!("/integrationlayer/2.0/mediaComposition/byUrn/urn:rts:video:{video_id}.json")
}

/// Archive page carrying `video_id` as its canonical identifier
pub fn page_html(video_id: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="dcterms.identifier" content="{video_id}">
  <meta name="dcterms.title" content="Gribouille en métro">
  <title>Gribouille en métro - Play RTS</title>
</head>
<body><div class="video-player" data-id="{video_id}"></div></body>
</html>"#
    )
}

/// Composition with one chapter for `video_id` offering SD and HD streams
pub fn composition_json(video_id: &str, master_url: &str) -> serde_json::Value {
    json!({
        "chapterUrn": format!("urn:rts:video:{video_id}"),
        "episode": {"id": "4716190", "title": "Verso"},
        "chapterList": [
            {
                "id": "4716180",
                "analyticsMetadata": {"media_segment_id": "4716180"},
                "resourceList": []
            },
            {
                "id": video_id,
                "analyticsMetadata": {"media_segment_id": video_id, "media_type": "Video"},
                "resourceList": [
                    {"quality": "SD", "mimeType": "application/x-mpegURL", "url": format!("{master_url}?sd=1")},
                    {"quality": "HD", "mimeType": "application/x-mpegURL", "url": format!("{master_url}?caption=fr")},
                    {"quality": "HD", "mimeType": "video/mp4", "url": "https://download.example/4716197.mp4"}
                ]
            }
        ]
    })
}

/// Master manifest listing one variant per bandwidth, under `base`
///
/// Variant `i` lives at `{base}/index_{i}_av.m3u8`.
pub fn master_manifest(base: &str, bandwidths: &[u64]) -> String {
    let mut text = String::from("#EXTM3U\n");
    for (i, bandwidth) in bandwidths.iter().enumerate() {
        text.push_str(&format!(
            "#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH={bandwidth},RESOLUTION=640x360,CODECS=\"avc1.77.30, mp4a.40.2\"\n"
        ));
        text.push_str(&format!("{base}/index_{i}_av.m3u8?null=0\n"));
    }
    text
}

/// Media playlist with `count` segments `{base}/segment{n}_2_av.ts`, n from 1
pub fn media_playlist(base: &str, count: usize) -> String {
    let mut text = String::from(
        "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-ALLOW-CACHE:YES\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXT-X-VERSION:3\n#EXT-X-MEDIA-SEQUENCE:1\n",
    );
    for n in 1..=count {
        text.push_str("#EXTINF:10.000,\n");
        text.push_str(&format!("{base}/segment{n}_2_av.ts?null=0\n"));
    }
    text.push_str("#EXT-X-ENDLIST\n");
    text
}

/// Three segment payloads of 10, 20 and 30 bytes
pub fn segment_payloads() -> Vec<Vec<u8>> {
    vec![vec![0x47; 10], vec![0x11; 20], vec![0x22; 30]]
}
