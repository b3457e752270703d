//! Rendering options and configuration.

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Spaces of indentation per list nesting level
    pub list_indent: usize,

    /// Marker for unordered list items
    pub bullet_marker: String,

    /// Marker for ordered list items
    pub ordered_marker: String,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width per nesting level.
    pub fn with_list_indent(mut self, width: usize) -> Self {
        self.list_indent = width;
        self
    }

    /// Set the unordered list marker.
    pub fn with_bullet_marker(mut self, marker: impl Into<String>) -> Self {
        self.bullet_marker = marker.into();
        self
    }

    /// Set the ordered list marker.
    pub fn with_ordered_marker(mut self, marker: impl Into<String>) -> Self {
        self.ordered_marker = marker.into();
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            list_indent: 2,
            bullet_marker: "-".to_string(),
            ordered_marker: "1.".to_string(),
            collect_stats: false,
        }
    }
}
