//! Byte-bounded bucket packing.
//!
//! Feed items are grouped into buckets that each fit one durable storage
//! slot. Packing is a single greedy pass that keeps item order, under two
//! budgets: a ceiling per bucket and a ceiling for all committed buckets.

use crate::model::FeedItem;

use super::measure::{byte_len, json_byte_len};

/// Default ceiling for one serialized bucket.
pub const PER_BUCKET_BYTES: usize = 9_000;

/// Default ceiling for all buckets of one packing run.
pub const TOTAL_BYTES: usize = 450_000;

/// Bytes held back for the ellipsis when truncating content.
pub const TRUNCATION_MARGIN: usize = 10;

/// Marker appended to truncated content.
pub const ELLIPSIS: &str = "...";

/// Worst-case bytes per content character assumed by the truncation estimate.
const BYTES_PER_CHAR: usize = 3;

/// Largest serialized size of one character: an astral character or a
/// `\u00XX` escape.
const MAX_BYTES_PER_CHAR: usize = 6;

/// Packing budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    /// Ceiling for one serialized bucket
    pub per_bucket_bytes: usize,

    /// Ceiling for the sum of all committed buckets
    pub total_bytes: usize,
}

impl PackOptions {
    /// Create pack options with the default budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-bucket ceiling.
    pub fn with_per_bucket_bytes(mut self, bytes: usize) -> Self {
        self.per_bucket_bytes = bytes;
        self
    }

    /// Set the total ceiling.
    pub fn with_total_bytes(mut self, bytes: usize) -> Self {
        self.total_bytes = bytes;
        self
    }
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            per_bucket_bytes: PER_BUCKET_BYTES,
            total_bytes: TOTAL_BYTES,
        }
    }
}

/// A group of feed items stored under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Items in feed order
    pub items: Vec<FeedItem>,

    /// Measured size of the serialized bucket
    pub bytes: usize,
}

impl Bucket {
    /// Serialize the bucket as a compact JSON array.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.items)?)
    }
}

/// What a packing run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOutcome {
    /// Finished buckets in order
    pub buckets: Vec<Bucket>,

    /// Sum of the bucket sizes
    pub total_bytes: usize,

    /// Number of items whose content was truncated
    pub truncated: usize,

    /// Number of input items left out of every bucket
    pub dropped: usize,

    /// Whether packing stopped because the total budget was reached
    pub exhausted: bool,
}

impl PackOutcome {
    /// Number of packed items.
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }
}

/// Greedy, order-preserving bucket packer.
#[derive(Debug, Clone, Default)]
pub struct BucketPacker {
    options: PackOptions,
}

impl BucketPacker {
    /// Create a packer with the given budgets.
    pub fn new(options: PackOptions) -> Self {
        Self { options }
    }

    /// Pack items into buckets.
    pub fn pack(&self, items: Vec<FeedItem>) -> PackOutcome {
        let input_count = items.len();
        let mut outcome = PackOutcome::default();

        let mut fitted = Vec::with_capacity(items.len());
        for item in items {
            match self.fit(item) {
                Fit::AsIs(item) => fitted.push(item),
                Fit::Truncated(item) => {
                    outcome.truncated += 1;
                    fitted.push(item);
                }
                Fit::TooLarge(id) => {
                    log::warn!("Feed item {} does not fit a bucket even without content", id);
                }
            }
        }

        let per_bucket = self.options.per_bucket_bytes;
        let total_budget = self.options.total_bytes;

        let mut current: Vec<FeedItem> = Vec::new();
        let mut current_bytes = 0;

        for item in fitted {
            let item_bytes = json_byte_len(&item);
            let with_item = if current.is_empty() {
                array_bytes(item_bytes)
            } else {
                current_bytes + 1 + item_bytes
            };

            if with_item <= per_bucket || current.is_empty() {
                current.push(item);
                current_bytes = with_item;
                continue;
            }

            if outcome.total_bytes + current_bytes > total_budget {
                outcome.exhausted = true;
                current.clear();
                break;
            }
            outcome.total_bytes += current_bytes;
            outcome.buckets.push(Bucket {
                items: std::mem::take(&mut current),
                bytes: current_bytes,
            });

            let solo = array_bytes(item_bytes);
            if outcome.total_bytes + solo > total_budget {
                outcome.exhausted = true;
                break;
            }
            current.push(item);
            current_bytes = solo;
        }

        if !current.is_empty() {
            if outcome.total_bytes + current_bytes <= total_budget {
                outcome.total_bytes += current_bytes;
                outcome.buckets.push(Bucket {
                    items: current,
                    bytes: current_bytes,
                });
            } else {
                outcome.exhausted = true;
            }
        }

        outcome.dropped = input_count - outcome.item_count();
        if outcome.exhausted {
            log::info!(
                "Total budget of {} bytes reached; {} items dropped",
                total_budget,
                outcome.dropped
            );
        }
        outcome
    }

    /// Make an item fit a bucket on its own, truncating its content if needed.
    fn fit(&self, mut item: FeedItem) -> Fit {
        let per_bucket = self.options.per_bucket_bytes;
        if solo_bytes(&item) <= per_bucket {
            return Fit::AsIs(item);
        }

        let content: Vec<char> = std::mem::take(&mut item.content).chars().collect();
        let empty_bytes = json_byte_len(&item);
        let safe_chars = per_bucket
            .saturating_sub(empty_bytes)
            .saturating_sub(TRUNCATION_MARGIN)
            / BYTES_PER_CHAR;

        let mut keep = safe_chars.min(content.len());
        loop {
            let mut truncated: String = content[..keep].iter().collect();
            truncated.push_str(ELLIPSIS);
            item.content = truncated;

            let size = solo_bytes(&item);
            if size <= per_bucket {
                return Fit::Truncated(item);
            }
            if keep == 0 {
                return Fit::TooLarge(item.id);
            }
            // Escaped or astral characters cost more than the estimate
            let over = (size - per_bucket).div_ceil(MAX_BYTES_PER_CHAR).max(1);
            keep = keep.saturating_sub(over);
        }
    }
}

/// Pack items with the given budgets.
pub fn pack(items: Vec<FeedItem>, options: &PackOptions) -> PackOutcome {
    BucketPacker::new(*options).pack(items)
}

/// Size of a bucket holding only this item.
pub fn solo_bytes(item: &FeedItem) -> usize {
    array_bytes(json_byte_len(item))
}

/// Serialized size of a list of items.
pub fn items_bytes(items: &[FeedItem]) -> usize {
    json_byte_len(items)
}

fn array_bytes(item_bytes: usize) -> usize {
    item_bytes.saturating_add(byte_len("[]"))
}

enum Fit {
    AsIs(FeedItem),
    Truncated(FeedItem),
    TooLarge(String),
}
