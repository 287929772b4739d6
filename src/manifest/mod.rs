//! HLS manifest handling
//!
//! Two playlist levels are involved in a download:
//! 1. Master manifest - one `#EXT-X-STREAM-INF:` directive per quality
//!    variant, each followed by the variant's playlist URL
//! 2. Media playlist - the ordered transport-stream segment URLs of one variant

pub mod master;
pub mod media;
pub mod stream_inf;

pub use stream_inf::{StreamInf, parse_stream_inf};
pub use master::{PlaylistVariant, VariantSelector, best_variant, parse_master_manifest};
pub use media::{SegmentListResolver, parse_media_playlist};
