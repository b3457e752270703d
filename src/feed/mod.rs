//! Feed packing, index maintenance and RSS assembly.
//!
//! Rendered articles become [`FeedItem`](crate::model::FeedItem)s, are
//! packed into byte-bounded [`Bucket`]s, committed to a durable store under
//! a [`BucketIndex`], and finally read back as an RSS 2.0 document.

pub mod index;
mod measure;
pub mod packer;
pub mod rss;

pub use index::{
    bucket_key, commit_buckets, read_index, BucketIndex, IndexLayout, DEFAULT_INDEX_KEY,
};
pub use measure::{byte_len, json_byte_len};
pub use packer::{
    items_bytes, pack, solo_bytes, Bucket, BucketPacker, PackOptions, PackOutcome, ELLIPSIS,
    PER_BUCKET_BYTES, TOTAL_BYTES, TRUNCATION_MARGIN,
};
pub use rss::{assemble_feed, escape_xml, load_items, to_rss, ChannelInfo};
