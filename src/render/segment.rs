//! Attribute run segmentation.
//!
//! A source reports style attributes per character offset. The segmenter
//! turns that lookup into the minimal list of runs of constant attributes.
//! The lookup is taken as a pure function so it can be driven by synthetic
//! attribute maps in tests.

use crate::model::{AttributeSet, StyledRun, StyledText};

/// Partition `[0, len)` into runs using boundary hints.
///
/// `boundaries` are the offsets where the source says attributes may change.
/// They are normalized first: offsets past `len` are dropped, `0` and `len`
/// are added, and the list is sorted and de-duplicated, which also removes
/// zero-width intervals. Each interval takes the attributes at its start;
/// neighbouring intervals with equal attributes are merged.
pub fn segment<F>(len: usize, boundaries: &[usize], attrs_at: F) -> Vec<StyledRun>
where
    F: Fn(usize) -> AttributeSet,
{
    if len == 0 {
        return Vec::new();
    }

    let mut cuts: Vec<usize> = boundaries.iter().copied().filter(|&b| b <= len).collect();
    cuts.push(0);
    cuts.push(len);
    cuts.sort_unstable();
    cuts.dedup();

    let mut runs: Vec<StyledRun> = Vec::with_capacity(cuts.len() - 1);
    for pair in cuts.windows(2) {
        push_merged(&mut runs, pair[0], pair[1], attrs_at(pair[0]));
    }
    runs
}

/// Partition `[0, len)` by asking for the attributes at every offset.
///
/// Slower than [`segment`] but needs no boundary hints.
pub fn segment_by_scan<F>(len: usize, attrs_at: F) -> Vec<StyledRun>
where
    F: Fn(usize) -> AttributeSet,
{
    let mut runs: Vec<StyledRun> = Vec::new();
    for offset in 0..len {
        push_merged(&mut runs, offset, offset + 1, attrs_at(offset));
    }
    runs
}

/// Segment a styled text element.
pub fn segment_text(text: &StyledText) -> Vec<StyledRun> {
    segment(text.char_len(), &text.attribute_indices(), |offset| {
        text.attributes_at(offset)
    })
}

fn push_merged(runs: &mut Vec<StyledRun>, start: usize, end: usize, attributes: AttributeSet) {
    match runs.last_mut() {
        Some(last) if last.attributes == attributes => last.end = end,
        _ => runs.push(StyledRun {
            start,
            end,
            attributes,
        }),
    }
}
