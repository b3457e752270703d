//! Integration tests for Markdown rendering.

use docfeed::render::{self, segment_text, RenderOptions};
use docfeed::{
    AttributeSet, Block, InlineContent, ListItem, Paragraph, SourceDocument, StyledText, Table,
};

fn render(blocks: &[Block]) -> String {
    render::to_markdown(blocks, &RenderOptions::default())
}

#[test]
fn test_heading_and_bullet() {
    let blocks = vec![
        Paragraph::heading("Hello", 1).into(),
        ListItem::bullet("World", 0).into(),
    ];
    assert_eq!(render(&blocks), "# Hello\n\n- World\n");
}

#[test]
fn test_empty_document() {
    assert_eq!(render(&[]), "\n");
    assert_eq!(render(&[Paragraph::with_text("   ").into()]), "\n");
}

#[test]
fn test_rule_between_paragraphs() {
    let blocks = vec![
        Paragraph::with_text("A").into(),
        Block::Rule,
        Paragraph::with_text("B").into(),
    ];
    assert_eq!(render(&blocks), "A\n\n---\n\nB\n");
}

#[test]
fn test_mixed_inline_styles() {
    let text = StyledText::new("bold italic link")
        .with_span(0, 4, AttributeSet::bold())
        .with_span(5, 11, AttributeSet::italic())
        .with_span(12, 16, AttributeSet::link("http://example.com"));
    let mut para = Paragraph::new();
    para.add_styled(text);

    assert_eq!(
        render(&[para.into()]),
        "**bold** *italic* [link](http://example.com)\n"
    );
}

#[test]
fn test_runs_partition_text() {
    let text = StyledText::new("abcdef")
        .with_span(1, 3, AttributeSet::bold())
        .with_span(3, 4, AttributeSet::bold())
        .with_span(5, 9, AttributeSet::italic());
    let runs = segment_text(&text);

    assert_eq!(runs.first().map(|r| r.start), Some(0));
    assert_eq!(runs.last().map(|r| r.end), Some(6));
    for pair in runs.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        assert_ne!(pair[0].attributes, pair[1].attributes);
    }
    // [0,1) plain, [1,4) bold, [4,5) plain, [5,6) italic
    assert_eq!(runs.len(), 4);
}

#[test]
fn test_table_padding() {
    let table = Table::from_rows(vec![vec!["H1", "H2"], vec!["D1"]]);
    assert_eq!(
        render(&[table.into()]),
        "| H1 | H2 |\n| --- | --- |\n| D1 |  |\n"
    );
}

#[test]
fn test_document_from_json() {
    let json = r#"{
        "title": "T",
        "blocks": [
            {"type": "paragraph", "heading": 2,
             "content": [{"type": "text", "text": "Intro"}]},
            {"type": "paragraph",
             "content": [
                {"type": "text", "text": "bold and link",
                 "spans": [{"start": 0, "end": 4, "bold": true},
                           {"start": 9, "end": 13, "link": "http://x.y"}]},
                {"type": "other", "kind": "inline_image"}
             ]},
            {"type": "list_item", "nesting_level": 1, "glyph": "LATIN_UPPER",
             "content": [{"type": "text", "text": "nested"}]},
            {"type": "table", "rows": [["a|b", "c\n\nd"], [null]]},
            {"type": "rule"},
            {"type": "fallback", "text": "  raw  "}
        ]
    }"#;
    let doc: SourceDocument = serde_json::from_str(json).unwrap();
    assert!(matches!(
        &doc.blocks[1],
        Block::Paragraph(p) if matches!(p.content[1], InlineContent::Other { .. })
    ));

    assert_eq!(
        render(&doc.blocks),
        "## Intro\n\n\
         **bold** and [link](http://x.y)\n\n  \
         1. nested\n\n\
         | a\\|b | c d |\n| --- | --- |\n|  |  |\n\n\
         ---\n\n\
         raw\n"
    );
}

#[test]
fn test_stats_collection() {
    let blocks = vec![
        Paragraph::heading("Title", 1).into(),
        Paragraph::with_text("one two three").into(),
        ListItem::numbered("item", 0).into(),
        Table::from_rows(vec![vec!["x"]]).into(),
        Block::Rule,
        Block::Fallback { text: None },
    ];
    let result = render::to_markdown_with_stats(&blocks, &RenderOptions::new().with_stats(true));

    assert_eq!(result.stats.heading_count, 1);
    assert_eq!(result.stats.paragraph_count, 1);
    assert_eq!(result.stats.list_item_count, 1);
    assert_eq!(result.stats.table_count, 1);
    assert_eq!(result.stats.rule_count, 1);
    assert!(result.content.starts_with("# Title\n\none two three\n\n1. item\n"));
}

#[test]
fn test_custom_markers() {
    let options = RenderOptions::new()
        .with_list_indent(4)
        .with_bullet_marker("*");
    let blocks: Vec<Block> = vec![
        ListItem::bullet("top", 0).into(),
        ListItem::bullet("deep", 1).into(),
    ];
    assert_eq!(
        render::to_markdown(&blocks, &options),
        "* top\n\n    * deep\n"
    );
}
