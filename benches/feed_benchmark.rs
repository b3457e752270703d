//! Benchmarks for docfeed rendering and packing performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic documents and feed items.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docfeed::feed::{pack, PackOptions};
use docfeed::render::{to_markdown, RenderOptions};
use docfeed::{AttributeSet, Block, FeedItem, ListItem, Paragraph, StyledText, Table};

/// Creates a synthetic document with the given number of sections.
fn create_test_document(sections: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(sections * 5);
    for i in 0..sections {
        blocks.push(Paragraph::heading(format!("Section {}", i + 1), 2).into());

        let text = StyledText::new("Some bold text, some italic text and a link to elsewhere.")
            .with_span(5, 9, AttributeSet::bold())
            .with_span(21, 27, AttributeSet::italic())
            .with_span(39, 56, AttributeSet::link("https://example.com"));
        let mut para = Paragraph::new();
        para.add_styled(text);
        blocks.push(para.into());

        blocks.push(ListItem::bullet("First point", 0).into());
        blocks.push(ListItem::numbered("Nested step", 1).into());
        blocks.push(Table::from_rows(vec![vec!["Key", "Value"], vec!["a|b", "1\n2"]]).into());
    }
    blocks
}

/// Creates feed items with content of the given character length.
fn create_feed_items(count: usize, content_len: usize) -> Vec<FeedItem> {
    (0..count)
        .map(|i| FeedItem {
            id: format!("doc{:04}", i),
            title: format!("Article {}", i),
            url: format!("https://docs.google.com/document/d/doc{:04}", i),
            content: "本文テキスト ".repeat(content_len / 7 + 1),
        })
        .collect()
}

/// Benchmark Markdown rendering at various sizes.
fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_rendering");
    let options = RenderOptions::default();

    for sections in [1, 10, 100].iter() {
        let blocks = create_test_document(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| to_markdown(black_box(&blocks), &options));
        });
    }

    group.finish();
}

/// Benchmark bucket packing with small and oversized items.
fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_packing");
    let options = PackOptions::default();

    for (name, count, len) in [("small_items", 200, 200), ("oversized_items", 60, 5_000)] {
        let items = create_feed_items(count, len);

        group.bench_function(name, |b| {
            b.iter(|| pack(black_box(items.clone()), &options));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rendering, bench_packing);
criterion_main!(benches);
