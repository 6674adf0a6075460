//! Text document abstraction consumed by the scanner.
//!
//! The engine never owns a text buffer. Hosts implement [`TextDocument`] on top of whatever
//! buffer they have; [`SourceDocument`] is a self-contained implementation backed by
//! [`LineIndex`].

use crate::line_index::LineIndex;

/// Position (line and column), both zero-based. Columns count chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line number (0-based)
    pub line: usize,
    /// Column number (0-based, in chars)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open `start..end` range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextRange {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl TextRange {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering whole lines `start_line..=end_line` (the end column is clamped by the document).
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start: Position::new(start_line, 0),
            end: Position::new(end_line, usize::MAX),
        }
    }

    /// Returns `true` if the range contains no characters.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Host text-buffer capabilities the scanner relies on.
///
/// All offsets are char offsets from the start of the document.
pub trait TextDocument {
    /// Language identifier used to look up comment rules (e.g. `"rust"`, `"plaintext"`).
    fn language_id(&self) -> &str;

    /// Full document text.
    fn text(&self) -> String;

    /// Text of `range`, clamped to the document.
    fn text_in(&self, range: TextRange) -> String {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        self.text().chars().skip(start).take(end.saturating_sub(start)).collect()
    }

    /// Convert a position to a char offset (clamped).
    fn offset_at(&self, position: Position) -> usize;

    /// Convert a char offset to a position (clamped).
    fn position_at(&self, offset: usize) -> Position;

    /// Number of lines (a document always has at least one line).
    fn line_count(&self) -> usize;

    /// Currently visible line ranges. Defaults to the whole document.
    fn visible_ranges(&self) -> Vec<TextRange> {
        vec![TextRange::lines(0, self.line_count().saturating_sub(1))]
    }
}

/// In-memory [`TextDocument`] backed by a rope line index.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    language_id: String,
    index: LineIndex,
    visible: Vec<TextRange>,
}

impl SourceDocument {
    /// Create a document with the given language id and text. The whole document is visible.
    pub fn new(language_id: impl Into<String>, text: &str) -> Self {
        Self {
            language_id: language_id.into(),
            index: LineIndex::from_text(text),
            visible: Vec::new(),
        }
    }

    /// Replace the document text. Visible ranges are kept.
    pub fn set_text(&mut self, text: &str) {
        self.index = LineIndex::from_text(text);
    }

    /// Set the visible line ranges (an empty list means "whole document").
    pub fn set_visible_ranges(&mut self, ranges: Vec<TextRange>) {
        self.visible = ranges;
    }

    /// Access the underlying line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Total number of chars.
    pub fn char_count(&self) -> usize {
        self.index.char_count()
    }
}

impl TextDocument for SourceDocument {
    fn language_id(&self) -> &str {
        &self.language_id
    }

    fn text(&self) -> String {
        self.index.get_text()
    }

    fn text_in(&self, range: TextRange) -> String {
        self.index
            .slice(self.offset_at(range.start), self.offset_at(range.end))
    }

    fn offset_at(&self, position: Position) -> usize {
        self.index
            .position_to_char_offset(position.line, position.column)
    }

    fn position_at(&self, offset: usize) -> Position {
        let (line, column) = self.index.char_offset_to_position(offset);
        Position::new(line, column)
    }

    fn line_count(&self) -> usize {
        self.index.line_count()
    }

    fn visible_ranges(&self) -> Vec<TextRange> {
        if self.visible.is_empty() {
            vec![TextRange::lines(0, self.line_count().saturating_sub(1))]
        } else {
            self.visible.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_document_positions() {
        let doc = SourceDocument::new("rust", "fn a() {}\n// TODO\n");

        assert_eq!(doc.language_id(), "rust");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.offset_at(Position::new(1, 3)), 13);
        assert_eq!(doc.position_at(13), Position::new(1, 3));
        assert_eq!(doc.text_in(TextRange::lines(1, 1)), "// TODO");
    }

    #[test]
    fn test_visible_ranges_default_to_whole_document() {
        let mut doc = SourceDocument::new("plaintext", "a\nb\nc");
        assert_eq!(doc.visible_ranges(), vec![TextRange::lines(0, 2)]);

        doc.set_visible_ranges(vec![TextRange::lines(1, 1)]);
        assert_eq!(doc.visible_ranges(), vec![TextRange::lines(1, 1)]);
        assert_eq!(doc.text_in(TextRange::lines(1, 1)), "b");
    }
}
