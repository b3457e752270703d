//! Markdown rendering for archive documents.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Block, InlineContent, ListItem, Paragraph, Table};

use super::inline::encode_inline;
use super::{ExtractionStats, RenderOptions, RenderResult};

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static CELL_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static ORDERED_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)NUMBER|LATIN|ROMAN|ALPHA").unwrap());

/// Convert a block sequence to Markdown.
pub fn to_markdown(blocks: &[Block], options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(blocks)
}

/// Convert a block sequence to Markdown with statistics.
pub fn to_markdown_with_stats(blocks: &[Block], options: &RenderOptions) -> RenderResult {
    let mut options = options.clone();
    options.collect_stats = true;
    MarkdownRenderer::new(options).render_with_stats(blocks)
}

/// Render a single block to its Markdown fragment.
pub fn render_block(block: &Block, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render_block(block)
}

/// Markdown renderer.
///
/// Blocks are rendered independently of each other; the renderer only
/// carries options and, when enabled, statistics.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a document to Markdown.
    ///
    /// The result always ends with exactly one newline; an empty document
    /// renders to `"\n"`.
    pub fn render(mut self, blocks: &[Block]) -> String {
        self.render_internal(blocks)
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, blocks: &[Block]) -> RenderResult {
        self.options.collect_stats = true;
        let content = self.render_internal(blocks);
        self.stats.count_text(&content);
        RenderResult::new(content, self.stats)
    }

    fn render_internal(&mut self, blocks: &[Block]) -> String {
        let fragments: Vec<String> = blocks.iter().map(|b| self.render_block(b)).collect();
        let joined = fragments.join("\n");
        let collapsed = BLANK_LINES.replace_all(&joined, "\n\n");

        let mut output = collapsed.trim().to_string();
        output.push('\n');
        output
    }

    /// Render one block.
    pub fn render_block(&mut self, block: &Block) -> String {
        let fragment = match block {
            Block::Paragraph(p) => self.render_paragraph(p),
            Block::ListItem(item) => self.render_list_item(item),
            Block::Table(t) => self.render_table(t),
            Block::Rule => {
                if self.options.collect_stats {
                    self.stats.rule_count += 1;
                }
                "\n---\n".to_string()
            }
            Block::Fallback { text } => self.render_fallback(text.as_deref()),
        };

        if self.options.collect_stats && fragment.is_empty() {
            self.stats.empty_block_count += 1;
        }
        fragment
    }

    fn render_paragraph(&mut self, para: &Paragraph) -> String {
        let text = self.render_inline(&para.content);
        if text.is_empty() {
            return String::new();
        }

        let prefix = heading_prefix(para.heading);
        if self.options.collect_stats {
            if prefix.is_empty() {
                self.stats.paragraph_count += 1;
            } else {
                self.stats.heading_count += 1;
            }
        }

        if prefix.is_empty() {
            format!("{}\n", text)
        } else {
            format!("{} {}\n", prefix, text)
        }
    }

    fn render_list_item(&mut self, item: &ListItem) -> String {
        let text = self.render_inline(&item.content);
        if text.is_empty() {
            return String::new();
        }
        if self.options.collect_stats {
            self.stats.list_item_count += 1;
        }

        let indent = " ".repeat(self.options.list_indent * item.nesting_level as usize);
        let marker = if is_ordered_glyph(&item.glyph) {
            &self.options.ordered_marker
        } else {
            &self.options.bullet_marker
        };

        format!("{}{} {}\n", indent, marker, text)
    }

    /// Render inline content and trim it at the paragraph level.
    fn render_inline(&mut self, content: &[InlineContent]) -> String {
        if self.options.collect_stats {
            let skipped = content
                .iter()
                .filter(|c| matches!(c, InlineContent::Other { .. }))
                .count();
            self.stats.skipped_inline_count += skipped as u32;
        }
        encode_inline(content).trim().to_string()
    }

    fn render_table(&mut self, table: &Table) -> String {
        if table.is_empty() {
            return String::new();
        }
        if self.options.collect_stats {
            self.stats.table_count += 1;
        }

        let mut matrix: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| {
                        let text = CELL_NEWLINES.replace_all(cell.text(), " ");
                        escape_table_cell(text.trim())
                    })
                    .collect()
            })
            .collect();

        let width = table.column_count();
        for row in &mut matrix {
            row.resize(width, String::new());
        }

        let mut output = String::new();
        let separator = vec!["---"; width];
        output.push_str(&format!("| {} |\n", matrix[0].join(" | ")));
        output.push_str(&format!("| {} |\n", separator.join(" | ")));
        for row in &matrix[1..] {
            output.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        output.push('\n');
        output
    }

    fn render_fallback(&mut self, text: Option<&str>) -> String {
        let text = text.unwrap_or("").trim();
        if text.is_empty() {
            return String::new();
        }
        if self.options.collect_stats {
            self.stats.fallback_count += 1;
        }
        format!("{}\n", text)
    }
}

/// Markdown heading prefix for a heading level.
///
/// Levels 1-6 map to that many `#`; no level, level 0 and anything above 6
/// map to an empty prefix.
pub fn heading_prefix(level: Option<u8>) -> &'static str {
    match level {
        Some(1) => "#",
        Some(2) => "##",
        Some(3) => "###",
        Some(4) => "####",
        Some(5) => "#####",
        Some(6) => "######",
        _ => "",
    }
}

/// Whether a list glyph tag denotes an ordered list.
///
/// Sources disagree on glyph names across locales, so any tag mentioning a
/// number, latin letter, roman numeral or alphabet counts as ordered.
pub fn is_ordered_glyph(glyph: &str) -> bool {
    ORDERED_GLYPH.is_match(glyph)
}

/// Escape pipe characters so cell text cannot break the table.
pub fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
