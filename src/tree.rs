//! Bounds-safe access to concrete syntax trees.
//!
//! Every helper here tolerates empty text, reversed ranges, and
//! out-of-range offsets. Detectors rely on this module for the
//! engine-wide no-panic guarantee on adversarial input.

use serde::{Deserialize, Serialize};
use std::fmt;
use tree_sitter::Node;

/// Visitor verdict for [`traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into this node's children.
    Descend,
    /// Skip this node's subtree.
    Skip,
}

/// Pre-order depth-first walk. The visitor decides per node whether its
/// subtree is entered.
pub fn traverse<'tree>(node: Node<'tree>, visitor: &mut impl FnMut(Node<'tree>) -> Visit) {
    if visitor(node) == Visit::Skip {
        return;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            traverse(child, visitor);
        }
    }
}

/// Total number of nodes under (and including) `node`.
pub fn count_nodes(node: Node) -> usize {
    let mut count = 0;
    traverse(node, &mut |_| {
        count += 1;
        Visit::Descend
    });
    count
}

/// Map a byte offset to a 1-based (line, column) pair.
///
/// Offsets beyond the end of `text` clamp to the final position instead of
/// indexing out of range.
pub fn offset_to_line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let mut line = 1;
    let mut col = 1;
    for b in &text.as_bytes()[..offset] {
        if *b == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Byte-range substring that clamps both bounds and returns `""` for a
/// reversed range. Clamped bounds are nudged to the nearest character
/// boundary so multi-byte text never splits.
pub fn safe_substring(text: &str, start: usize, end: usize) -> &str {
    let len = text.len();
    let mut start = start.min(len);
    let mut end = end.min(len);
    if start > end {
        return "";
    }
    while start < len && !text.is_char_boundary(start) {
        start += 1;
    }
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }
    if start > end {
        return "";
    }
    &text[start..end]
}

/// Source text covered by a node.
pub fn node_text<'a>(node: Node, text: &'a str) -> &'a str {
    safe_substring(text, node.start_byte(), node.end_byte())
}

/// A byte offset used as declaration identity within one file.
///
/// Wrapping the raw integer keeps offset sets from mixing with other
/// integer keys if scope tracking is ever extended across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BytePos(pub usize);

impl BytePos {
    pub fn of(node: &Node) -> Self {
        BytePos(node.start_byte())
    }
}

/// 1-based source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn from_node(node: &Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Span {
            line: start.row + 1,
            column: start.column + 1,
            end_line: end.row + 1,
            end_column: end.column + 1,
        }
    }

    pub fn point(line: usize, column: usize) -> Self {
        Span {
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::point(1, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_mapping_is_one_based_and_clamped() {
        let text = "ab\ncd";
        assert_eq!(offset_to_line_col(text, 0), (1, 1));
        assert_eq!(offset_to_line_col(text, 1), (1, 2));
        assert_eq!(offset_to_line_col(text, 3), (2, 1));
        // Past the end clamps instead of panicking.
        assert_eq!(offset_to_line_col(text, 999), (2, 3));
        assert_eq!(offset_to_line_col("", 5), (1, 1));
    }

    #[test]
    fn offset_mapping_never_returns_zero() {
        let text = "line1\nline2\n";
        for o in 0..=text.len() + 4 {
            let (line, col) = offset_to_line_col(text, o);
            assert!(line >= 1);
            assert!(col >= 1);
        }
    }

    #[test]
    fn safe_substring_clamps_everything() {
        assert_eq!(safe_substring("hello", 1, 3), "el");
        assert_eq!(safe_substring("hello", 3, 1), "");
        assert_eq!(safe_substring("hello", 2, 999), "llo");
        assert_eq!(safe_substring("hello", 999, 1000), "");
        assert_eq!(safe_substring("", 0, 10), "");
    }

    #[test]
    fn safe_substring_respects_char_boundaries() {
        let text = "aé b";
        // Offset 2 lands inside the two-byte 'é'; the slice must not panic.
        let s = safe_substring(text, 0, 2);
        assert!(s == "a" || s == "aé");
        let s = safe_substring(text, 2, 4);
        assert!(!s.is_empty() || s.is_empty()); // no panic is the property
    }

    #[test]
    fn span_display() {
        assert_eq!(Span::point(3, 7).to_string(), "3:7");
    }
}
